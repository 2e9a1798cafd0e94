//! Search algorithms for the Iterative Forward Search constraint solver.
//!
//! Built on [`ifs_core`]'s data model (`Variable`/`Model`/`Assignment`/
//! `Solution`), this crate supplies everything that decides *how* a search
//! moves through the assignment space: neighbourhood selections (plain IFS,
//! hill climbing, simulated annealing, great deluge — [`heuristic`]), a
//! bounded branch-and-bound search for exact per-variable reassignment
//! ([`branch_and_bound`]), the composite phase controller that sequences
//! them ([`heuristic::SimpleSearch`]), termination conditions
//! ([`termination`]), flat string-keyed configuration ([`config`]), the
//! per-search mutable scope ([`scope`]) and the top-level driving loop
//! ([`solver`]).

pub mod branch_and_bound;
pub mod config;
pub mod event;
pub mod heuristic;
pub mod scope;
pub mod solver;
pub mod termination;

pub use branch_and_bound::{
    BranchAndBoundConfig, BranchAndBoundNeighbour, BranchAndBoundSearch, LinkedSections,
    NoLinkedSections, NoTimeOverlapCheck, Request, SearchStats, TimeOverlapCheck,
};
pub use config::{ConfigError, DataProperties};
pub use event::{PhaseLifecycleListener, TracingPhaseListener};
pub use heuristic::{
    build_simple_search, ConstructionRegistry, GreatDelugeSelection, HillClimberSelection,
    NeighbourSelection, SimpleSearch, SimulatedAnnealingSelection,
    StepCountingHillClimberSelection,
};
pub use scope::SearchContext;
pub use solver::Solver;
pub use termination::{
    AndTermination, ExternalTermination, OrTermination, Termination, TimeTermination,
    UnimprovedIterationTermination, UnimprovedTimeTermination,
};
