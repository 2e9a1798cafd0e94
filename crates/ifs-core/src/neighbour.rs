//! The neighbour abstraction: a candidate move out of the current assignment.

use std::fmt::Debug;

use crate::domain::{Assignment, Variable};

/// A candidate change to an [`Assignment`], together with the objective
/// delta it would introduce.
///
/// This stands in for the teacher's `Move` + `ScoreDirector` + undo-capture
/// machinery: because this core's objective is a plain `f64` rather than a
/// multi-level `Score`, and assignment is direct rather than routed through
/// an incremental score director, a neighbour only needs to report its
/// delta and know how to apply itself. There is no separate `undo` — an
/// acceptor that rejects a neighbour simply never calls
/// [`assign`](Neighbour::assign), and restoring an earlier assignment (e.g.
/// simulated annealing's "restore" step) goes through
/// [`Assignment::restore_snapshot`] instead of undoing one move at a time.
pub trait Neighbour<V: Variable>: Debug {
    /// The objective delta this neighbour would introduce if applied (lower
    /// is better). `f64::INFINITY` (or any very large value) signals a
    /// neighbour that turned out not to be viable and should be discarded
    /// rather than assigned.
    fn value(&self, assignment: &Assignment<V>) -> f64;

    /// Applies this neighbour to `assignment`, tagging the mutation with
    /// `iteration`.
    fn assign(&self, assignment: &mut Assignment<V>, iteration: u64);
}
