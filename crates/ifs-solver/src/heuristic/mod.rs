//! Neighbourhood selection: the family of algorithms that decide which
//! [`ifs_core::Neighbour`] to apply next.

pub mod builder;
pub mod great_deluge;
pub mod hill_climbing;
pub mod selector;
pub mod simple_search;
pub mod simulated_annealing;

use std::fmt::Debug;

use ifs_core::{Model, Neighbour, Variable};

use crate::scope::SearchContext;

pub use builder::{build_simple_search, ConstructionRegistry};
pub use great_deluge::GreatDelugeSelection;
pub use hill_climbing::{HillClimberSelection, StepCountingHillClimberSelection};
pub use simple_search::SimpleSearch;
pub use simulated_annealing::SimulatedAnnealingSelection;

/// Picks the next neighbour to apply to the working assignment, or `None` if
/// it has given up for this iteration (the solver loop then just advances to
/// the next iteration without applying anything).
///
/// Implementations range from a bare candidate generator (no acceptance
/// logic — [`selector::standard::StandardNeighbourSelection`]) to a full
/// accept/reject loop wrapping an inner selection (hill climbing, simulated
/// annealing, great deluge). The composite controller
/// ([`SimpleSearch`]) switches between several of these over the
/// course of a search.
pub trait NeighbourSelection<V: Variable, M: Model<V>>: Debug + Send {
    /// Proposes (and, for the accept/reject wrappers, vets) the next
    /// neighbour.
    fn select_neighbour(
        &mut self,
        context: &mut SearchContext<V, M>,
    ) -> Option<Box<dyn Neighbour<V>>>;

    /// Called once by [`crate::solver::Solver::solve`] after its main loop
    /// exits, before returning. The default does nothing; [`SimpleSearch`]
    /// overrides it to run a final hill-climbing sweep over the best-known
    /// assignment (spec §4.6: "on termination, a final sweep of hill
    /// climbing is performed to polish the best-known solution").
    fn finalize(&mut self, context: &mut SearchContext<V, M>) {
        let _ = context;
    }
}
