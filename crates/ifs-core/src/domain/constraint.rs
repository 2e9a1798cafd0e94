//! Constraint traits.

use std::fmt::Debug;

use super::assignment::Assignment;
use super::variable::{Variable, VariableId};

/// A relation over a set of variables that can judge a proposed assignment.
///
/// For a proposed `(variable, value)` pair, a constraint can enumerate the
/// currently-assigned values that would conflict with it
/// ([`conflict_values`](Constraint::conflict_values)), or answer the cheaper
/// `in_conflict` question directly. Constraints are hard by default
/// (`is_hard` returns true); soft constraints report `is_hard() == false` and
/// contribute to [`crate::model::Model::get_total_value`] instead of
/// blocking assignment.
pub trait Constraint<V: Variable>: Debug + Send + Sync {
    /// The ids of the variables this constraint relates.
    fn variables(&self) -> &[VariableId];

    /// Returns every currently-assigned value that conflicts with assigning
    /// `value` to its variable.
    fn conflict_values(&self, assignment: &Assignment<V>, value: &V::Value) -> Vec<V::Value>;

    /// Cheap check: would assigning `value` put this constraint in conflict?
    ///
    /// The default implementation defers to [`conflict_values`], which is
    /// correct but may do more work than necessary; constraints that can
    /// answer this question directly should override it.
    fn in_conflict(&self, assignment: &Assignment<V>, value: &V::Value) -> bool {
        !self.conflict_values(assignment, value).is_empty()
    }

    /// True if this is a hard constraint (must never be violated in a
    /// quiescent assignment). False means the constraint is soft and is
    /// scored, not enforced.
    fn is_hard(&self) -> bool {
        true
    }
}

/// A constraint that relates to all variables in the model and participates
/// in every assignment check, rather than just the variables it names.
///
/// Used by branch-and-bound (spec §4.7) to validate a candidate against the
/// rest of the model's current assignment, independent of which entity's
/// search stack produced the candidate.
pub trait GlobalConstraint<V: Variable>: Constraint<V> {}
