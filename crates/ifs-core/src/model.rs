//! The model: the read-only problem definition search runs over.

use std::fmt::Debug;

use crate::domain::{Assignment, Constraint, GlobalConstraint, Value, Variable, VariableId};

/// The problem definition: the complete set of variables, constraints and
/// global constraints a search runs over.
///
/// A `Model` is read-only for the lifetime of a search (spec §3 invariant 1)
/// — all mutable state lives in the [`Assignment`] passed alongside it.
/// Implementors typically own their variables and constraints directly and
/// hand out borrows; there is no equivalent here of the teacher's
/// constraint-streams DSL or incremental score director, since this core
/// works directly against `conflict_values`/`get_total_value` rather than
/// compiled constraint matches.
pub trait Model<V: Variable>: Debug + Send + Sync {
    /// All variables in the model, in a stable order.
    fn variables(&self) -> &[V];

    /// All (non-global) constraints in the model.
    fn constraints(&self) -> &[Box<dyn Constraint<V>>];

    /// All global constraints in the model.
    fn global_constraints(&self) -> &[Box<dyn GlobalConstraint<V>>];

    /// Looks up a variable by id.
    fn variable(&self, id: VariableId) -> &V {
        &self.variables()[id.index()]
    }

    /// Every currently-assigned value that conflicts with assigning `value`
    /// to its variable, across all (global and non-global) constraints that
    /// relate to it.
    ///
    /// This is the single entry point neighbourhood selections and
    /// branch-and-bound use to check a candidate before committing it (spec
    /// §3, §4.2, §4.7); individual constraints are never queried directly by
    /// search code.
    fn conflict_values(&self, assignment: &Assignment<V>, value: &V::Value) -> Vec<V::Value> {
        let mut conflicts = Vec::new();
        for constraint in self.constraints() {
            if constraint.variables().contains(&value.variable_id()) {
                conflicts.extend(constraint.conflict_values(assignment, value));
            }
        }
        for constraint in self.global_constraints() {
            conflicts.extend(constraint.conflict_values(assignment, value));
        }
        conflicts
    }

    /// The total value (sum of soft-constraint penalties, lower is better) of
    /// the given assignment.
    ///
    /// Unassigned variables contribute nothing; this is therefore comparable
    /// across assignments of differing completeness only when the caller
    /// accounts for that separately (e.g. branch-and-bound's two-objective
    /// mode, spec §4.7, treats unassigned-variable count as the primary
    /// objective and this value as the secondary one).
    fn get_total_value(&self, assignment: &Assignment<V>) -> f64;
}
