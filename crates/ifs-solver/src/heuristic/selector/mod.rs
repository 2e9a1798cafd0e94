//! Variable and value selection policies, and the standard neighbourhood
//! selection that composes them.

pub mod standard;
pub mod value_selection;
pub mod variable_selection;

pub use standard::{SimpleNeighbour, StandardNeighbourSelection};
pub use value_selection::{
    RandomValueSelection, ValueSelection, WeightedMinimumValueSelection,
    WeightedRandomValueSelection,
};
pub use variable_selection::{
    HardestVariableSelection, RandomVariableSelection, UnassignedFirstVariableSelection,
    VariableSelection,
};
