//! Core data model for the iterative forward search constraint solver.
//!
//! This crate defines the vocabulary every search algorithm is built on:
//! [`domain::Variable`]/[`domain::Value`] (the planning domain),
//! [`domain::Constraint`]/[`domain::GlobalConstraint`] (what makes an
//! assignment valid), [`domain::Assignment`] (the mutable search state),
//! [`model::Model`] (the read-only problem definition) and
//! [`solution::Solution`] (model + assignment + best-known state). It has no
//! opinion on *how* a search explores the space — that lives in the
//! `ifs-solver` crate.

pub mod domain;
pub mod error;
pub mod model;
pub mod neighbour;
pub mod progress;
pub mod solution;
#[cfg(feature = "test-support")]
pub mod test_support;
pub mod weights;

pub use domain::{Assignment, AssignmentContextProvider, AssignmentId, Constraint};
pub use domain::{GlobalConstraint, Value, Variable, VariableId};
pub use error::{IfsError, Result};
pub use model::Model;
pub use neighbour::Neighbour;
pub use progress::{Progress, TracingProgress};
pub use solution::{Solution, SolutionListener};
pub use weights::{EntityWeights, UniformWeights};
