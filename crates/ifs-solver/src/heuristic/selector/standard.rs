//! The standard neighbourhood selection: pick a variable, pick a value,
//! evaluate the resulting delta.

use std::fmt::Debug;

use ifs_core::{Assignment, Model, Neighbour, Variable, VariableId};
use smallvec::SmallVec;

use super::value_selection::ValueSelection;
use super::variable_selection::VariableSelection;
use crate::heuristic::NeighbourSelection;
use crate::scope::SearchContext;

/// The conflicting variables a single candidate value displaces. A
/// conflict set this small (one variable directly competing for a slot, plus
/// the occasional indirect knock-on) almost never needs heap storage.
type ConflictSet = SmallVec<[VariableId; 4]>;

/// A neighbour produced by [`StandardNeighbourSelection`]: assign `value` to
/// its variable, first unassigning whichever currently-assigned values it
/// would conflict with.
///
/// `delta` is computed once, at selection time, against the assignment as it
/// stood then (spec §4.2) — it is not recomputed when
/// [`assign`](Neighbour::assign) is finally called, which matters only if
/// something else mutates the assignment in between (the standard solver
/// loop never does).
#[derive(Debug, Clone)]
pub struct SimpleNeighbour<V: Variable> {
    variable: VariableId,
    value: V::Value,
    unassign: ConflictSet,
    delta: f64,
}

impl<V: Variable> SimpleNeighbour<V> {
    pub fn new(variable: VariableId, value: V::Value, unassign: impl IntoIterator<Item = VariableId>, delta: f64) -> Self {
        let unassign = unassign.into_iter().collect();
        Self {
            variable,
            value,
            unassign,
            delta,
        }
    }

    /// The variable this neighbour would (re)assign.
    pub fn variable(&self) -> VariableId {
        self.variable
    }

    /// The value it would assign.
    pub fn candidate_value(&self) -> &V::Value {
        &self.value
    }
}

impl<V: Variable> Neighbour<V> for SimpleNeighbour<V> {
    fn value(&self, _assignment: &Assignment<V>) -> f64 {
        self.delta
    }

    fn assign(&self, assignment: &mut Assignment<V>, iteration: u64) {
        for conflict in &self.unassign {
            assignment.unassign(iteration, *conflict);
        }
        assignment.assign(iteration, self.value.clone());
    }
}

/// The baseline neighbourhood selection (spec §4.2): pick a variable via a
/// [`VariableSelection`] policy, pick a candidate value for it via a
/// [`ValueSelection`] policy, resolve conflicts by unassigning whatever the
/// candidate would conflict with, and report the resulting total-value
/// delta.
///
/// This selection never itself decides whether the delta is acceptable —
/// that's the acceptors' job ([`crate::heuristic::hill_climbing`],
/// [`crate::heuristic::simulated_annealing`],
/// [`crate::heuristic::great_deluge`]), which wrap a
/// `StandardNeighbourSelection` as their candidate generator.
pub struct StandardNeighbourSelection<V: Variable, M: Model<V>> {
    variable_selection: Box<dyn VariableSelection<V, M>>,
    value_selection: Box<dyn ValueSelection<V, M>>,
}

impl<V: Variable, M: Model<V>> Debug for StandardNeighbourSelection<V, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardNeighbourSelection").finish()
    }
}

impl<V: Variable, M: Model<V>> StandardNeighbourSelection<V, M> {
    pub fn new(
        variable_selection: Box<dyn VariableSelection<V, M>>,
        value_selection: Box<dyn ValueSelection<V, M>>,
    ) -> Self {
        Self {
            variable_selection,
            value_selection,
        }
    }
}

impl<V: Variable, M: Model<V>> NeighbourSelection<V, M> for StandardNeighbourSelection<V, M> {
    fn select_neighbour(
        &mut self,
        context: &mut SearchContext<V, M>,
    ) -> Option<Box<dyn Neighbour<V>>> {
        let variable = self.variable_selection.select_variable(context)?;
        let value = self.value_selection.select_value(context, variable)?;

        let solution = context.solution();
        let assignment = solution.assignment();
        let model = solution.model();

        let conflicts = model.conflict_values(assignment, &value);
        let unassign_ids: Vec<VariableId> = conflicts.iter().map(|v| v.variable_id()).collect();

        let mut simulated = assignment.snapshot();
        for id in &unassign_ids {
            simulated.remove(id);
        }
        simulated.insert(value.variable_id(), value.clone());

        let before = solution.current_value();
        let after = evaluate_snapshot(model, &simulated);
        let delta = after - before;

        Some(Box::new(SimpleNeighbour::new(
            variable,
            value,
            unassign_ids,
            delta,
        )))
    }
}

/// Evaluates `get_total_value` against a candidate snapshot without
/// mutating the live assignment: builds a scratch `Assignment` sharing the
/// same variable-id universe, seeded with the candidate values.
fn evaluate_snapshot<V: Variable, M: Model<V>>(
    model: &M,
    snapshot: &std::collections::HashMap<VariableId, V::Value>,
) -> f64 {
    let mut scratch = Assignment::<V>::new(model.variables().iter().map(|v| v.id()).collect());
    for value in snapshot.values() {
        scratch.assign(0, value.clone());
    }
    model.get_total_value(&scratch)
}
