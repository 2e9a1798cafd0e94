//! The assignment: the authoritative variable → value map at the current
//! search state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::variable::{Variable, VariableId};

/// Stable identity of an [`Assignment`], used to key per-assignment side
/// tables (see [`crate::context::AssignmentContextProvider`]).
///
/// Distinct `Assignment`s never share an id, even across the lifetime of a
/// process, which lets context providers be reused safely across parallel
/// restarts (spec §5) without accidentally aliasing state between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssignmentId(u64);

static NEXT_ASSIGNMENT_ID: AtomicU64 = AtomicU64::new(0);

impl AssignmentId {
    fn next() -> Self {
        Self(NEXT_ASSIGNMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The variable → value map that is mutated as the search progresses.
///
/// Every mutation is tagged with a monotonically increasing iteration
/// counter (spec §3 invariant 2), used by listeners and for tie-breaks.
/// `Assignment` does not itself enforce hard-constraint closure — callers
/// (the solver loop, neighbourhood selections, branch-and-bound) are
/// expected to have already removed conflicting values, typically via
/// [`crate::model::Model::conflict_values`], before calling
/// [`assign`](Assignment::assign).
#[derive(Debug)]
pub struct Assignment<V: Variable> {
    id: AssignmentId,
    variable_ids: Vec<VariableId>,
    values: HashMap<VariableId, V::Value>,
    iteration: u64,
    first_complete_iteration: Option<u64>,
}

impl<V: Variable> Assignment<V> {
    /// Creates a new, empty assignment over the given variables.
    ///
    /// `variable_ids` should be the complete id set of the model this
    /// assignment will be used with; it is used to answer
    /// [`unassigned_variables`](Assignment::unassigned_variables) without a
    /// back-reference to the model.
    pub fn new(variable_ids: Vec<VariableId>) -> Self {
        Self {
            id: AssignmentId::next(),
            variable_ids,
            values: HashMap::new(),
            iteration: 0,
            first_complete_iteration: None,
        }
    }

    /// This assignment's stable identity.
    pub fn id(&self) -> AssignmentId {
        self.id
    }

    /// The current iteration counter.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// The iteration at which every variable first became assigned, if that
    /// has ever happened (spec §3 invariant 4). Never reset, even if the
    /// assignment later becomes incomplete again.
    pub fn first_complete_iteration(&self) -> Option<u64> {
        self.first_complete_iteration
    }

    /// The currently assigned value for `variable`, if any.
    pub fn get_value(&self, variable: VariableId) -> Option<&V::Value> {
        self.values.get(&variable)
    }

    /// Assigns `value` to its owning variable at the given iteration.
    ///
    /// `iteration` must be at least [`iteration`](Self::iteration); it
    /// becomes the new current iteration. A single neighbour application
    /// that touches several variables (e.g. unassigning conflicts before
    /// assigning the new value) tags every one of its mutations with the
    /// same iteration — the counter advances once per neighbour, not once
    /// per variable touched. Overwrites any previous value for the same
    /// variable without unassigning it first — callers that need the old
    /// value back (e.g. to report it to listeners) should read it via
    /// [`get_value`](Self::get_value) beforehand.
    pub fn assign(&mut self, iteration: u64, value: V::Value) {
        debug_assert!(
            iteration >= self.iteration,
            "iteration counter must not move backwards"
        );
        self.iteration = iteration;
        self.values.insert(value.variable_id(), value);
        if self.first_complete_iteration.is_none() && self.is_complete() {
            self.first_complete_iteration = Some(iteration);
        }
    }

    /// Unassigns `variable` at the given iteration, returning its previous
    /// value if it had one. See [`assign`](Self::assign) for the tagging
    /// contract.
    pub fn unassign(&mut self, iteration: u64, variable: VariableId) -> Option<V::Value> {
        debug_assert!(
            iteration >= self.iteration,
            "iteration counter must not move backwards"
        );
        self.iteration = iteration;
        self.values.remove(&variable)
    }

    /// Number of currently assigned variables.
    pub fn nr_assigned_variables(&self) -> usize {
        self.values.len()
    }

    /// True iff every variable in the model has an assigned value.
    pub fn is_complete(&self) -> bool {
        self.values.len() == self.variable_ids.len()
    }

    /// Ids of variables that currently have no assigned value.
    pub fn unassigned_variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.variable_ids
            .iter()
            .copied()
            .filter(move |id| !self.values.contains_key(id))
    }

    /// Ids of variables that currently have an assigned value.
    pub fn assigned_variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.values.keys().copied()
    }

    /// A shallow snapshot of the current assignment (variable → value
    /// references/clones), suitable for restoring later via
    /// [`restore_snapshot`](Self::restore_snapshot).
    pub fn snapshot(&self) -> HashMap<VariableId, V::Value> {
        self.values.clone()
    }

    /// Replaces the current map with a previously taken snapshot, tagging
    /// the change with `iteration`. Used to restore the best-known
    /// assignment (e.g. simulated annealing's "restore" step, spec §4.4).
    pub fn restore_snapshot(&mut self, iteration: u64, snapshot: HashMap<VariableId, V::Value>) {
        debug_assert!(
            iteration >= self.iteration,
            "iteration counter must not move backwards"
        );
        self.iteration = iteration;
        self.values = snapshot;
    }
}
