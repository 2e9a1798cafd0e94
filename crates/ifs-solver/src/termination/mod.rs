//! Conditions for stopping a search.

mod composite;
mod external;
mod time;
mod unimproved;

use std::fmt::Debug;

use ifs_core::{Model, Variable};

use crate::scope::SearchContext;

pub use composite::{AndTermination, OrTermination};
pub use external::ExternalTermination;
pub use time::TimeTermination;
pub use unimproved::{UnimprovedIterationTermination, UnimprovedTimeTermination};

/// Decides whether a search should stop.
///
/// Checked once per iteration by [`crate::solver::Solver::solve`] (and,
/// inside the composite controller, once per phase switch) — a termination
/// never stops a search mid-iteration, only between iterations, so
/// implementations don't need to worry about being called with a partially
/// applied neighbour.
pub trait Termination<V: Variable, M: Model<V>>: Debug + Send {
    /// True if the search should stop now.
    fn is_terminated(&self, context: &SearchContext<V, M>) -> bool;
}
