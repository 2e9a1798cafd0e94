//! Per-entity weighting for penalty-based objectives.

use crate::domain::{Assignment, Variable};

/// Assigns a relative importance weight to each variable's "entity" (e.g. a
/// student in student sectioning), used to scale penalty contributions so
/// that, all else equal, violating a higher-weighted entity's preference
/// costs more than violating a lower-weighted one's.
///
/// Mirrors spec §6's `StudentWeights` collaborator interface
/// (`getWeight`/`getDistanceConflictWeight`/`getTimeOverlapConflictWeight`):
/// the base weight is mandatory, the two conflict-specific weights default to
/// zero so a model that has no notion of distance or time-overlap conflicts
/// (most toy/test models) doesn't need to implement them. Branch-and-bound's
/// value ordering (spec §4.7) sums all three into one candidate score;
/// callers that don't need differentiated weighting can use
/// [`UniformWeights`].
pub trait EntityWeights<V: Variable>: Send + Sync {
    /// The weight to apply to `variable`'s penalty contributions. Must be
    /// strictly positive.
    fn weight(&self, variable: &V) -> f64;

    /// Extra cost contributed by assigning `value` due to distance conflicts
    /// with the entity's other current assignments (e.g. two sections in
    /// different buildings with not enough travel time between them).
    fn distance_conflict_weight(&self, assignment: &Assignment<V>, value: &V::Value) -> f64 {
        let _ = (assignment, value);
        0.0
    }

    /// Extra cost contributed by assigning `value` due to time overlaps with
    /// the entity's other current assignments.
    fn time_overlap_weight(&self, assignment: &Assignment<V>, value: &V::Value) -> f64 {
        let _ = (assignment, value);
        0.0
    }
}

/// An [`EntityWeights`] that assigns every variable the same weight of 1.0
/// and no distance/time-overlap cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformWeights;

impl<V: Variable> EntityWeights<V> for UniformWeights {
    fn weight(&self, _variable: &V) -> f64 {
        1.0
    }
}
