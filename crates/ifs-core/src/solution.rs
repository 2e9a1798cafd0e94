//! The solution: a model paired with its evolving assignment and best-known
//! state.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::{Assignment, Variable, VariableId};
use crate::model::Model;

/// Receives notifications as a [`Solution`] changes.
///
/// Kept deliberately narrow (no reference to `Solution` itself, which would
/// force the trait to carry both the `V` and `M` type parameters into every
/// `Arc<dyn SolutionListener<_>>` call site) — listeners get the scalar
/// facts they need to react, and call back into the solver/solution through
/// their own handle if they need more.
pub trait SolutionListener<V: Variable>: Debug + Send + Sync {
    /// Called after a variable's value changes (assigned or unassigned).
    fn value_changed(&self, variable: VariableId, iteration: u64) {
        let _ = (variable, iteration);
    }

    /// Called whenever a new best solution is saved.
    fn best_saved(&self, best_value: f64, best_iteration: u64) {
        let _ = (best_value, best_iteration);
    }

    /// Called when the best-known assignment is restored into the working
    /// assignment (e.g. after simulated annealing gives up on the current
    /// branch, spec §4.4).
    fn best_restored(&self, best_value: f64, best_iteration: u64) {
        let _ = (best_value, best_iteration);
    }
}

/// Pairs a [`Model`] with the [`Assignment`] being searched over, and tracks
/// the best assignment found so far.
///
/// The best-known state lives here rather than on `Model` (spec §9 resolves
/// this in favour of `Solution`, since `Model` is read-only for the
/// lifetime of a search — see DESIGN.md).
pub struct Solution<V: Variable, M: Model<V>> {
    model: M,
    assignment: Assignment<V>,
    current_value: f64,
    best_assignment: Option<HashMap<VariableId, V::Value>>,
    best_value: f64,
    best_iteration: u64,
    listeners: Vec<Arc<dyn SolutionListener<V>>>,
}

impl<V: Variable, M: Model<V>> Solution<V, M> {
    /// Builds a solution over `model`, starting from `assignment`.
    ///
    /// The starting assignment's value becomes the initial best.
    pub fn new(model: M, assignment: Assignment<V>) -> Self {
        let current_value = model.get_total_value(&assignment);
        let best_assignment = if assignment.is_complete() {
            Some(assignment.snapshot())
        } else {
            None
        };
        let best_iteration = assignment.iteration();
        Self {
            model,
            current_value,
            best_value: current_value,
            best_assignment,
            best_iteration,
            assignment,
            listeners: Vec::new(),
        }
    }

    /// The model being searched over.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The current working assignment.
    pub fn assignment(&self) -> &Assignment<V> {
        &self.assignment
    }

    /// Mutable access to the current working assignment, for components that
    /// apply neighbours directly.
    pub fn assignment_mut(&mut self) -> &mut Assignment<V> {
        &mut self.assignment
    }

    /// The total value of the current working assignment, as of the last
    /// call to [`recompute_current_value`](Self::recompute_current_value).
    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    /// The total value of the best-known complete assignment.
    pub fn best_value(&self) -> f64 {
        self.best_value
    }

    /// The iteration at which the current best was found.
    pub fn best_iteration(&self) -> u64 {
        self.best_iteration
    }

    /// The best-known complete assignment, if one has ever been found.
    pub fn best_assignment(&self) -> Option<&HashMap<VariableId, V::Value>> {
        self.best_assignment.as_ref()
    }

    /// Registers a listener for value-change and best-solution notifications.
    pub fn add_listener(&mut self, listener: Arc<dyn SolutionListener<V>>) {
        self.listeners.push(listener);
    }

    /// Recomputes [`current_value`](Self::current_value) from the model and
    /// working assignment. Neighbour selections call this after applying a
    /// move; it is not done automatically so that callers can batch several
    /// moves before paying the recomputation cost.
    pub fn recompute_current_value(&mut self) {
        self.current_value = self.model.get_total_value(&self.assignment);
    }

    /// Notifies listeners that `variable` changed at `iteration`.
    pub fn notify_value_changed(&self, variable: VariableId, iteration: u64) {
        for listener in &self.listeners {
            listener.value_changed(variable, iteration);
        }
    }

    /// If the working assignment is complete and its current value improves
    /// on the best-known value, saves it as the new best and notifies
    /// listeners. Returns true if a new best was saved.
    pub fn save_best_if_improved(&mut self) -> bool {
        if !self.assignment.is_complete() {
            return false;
        }
        if self.best_assignment.is_some() && self.current_value >= self.best_value {
            return false;
        }
        self.best_value = self.current_value;
        self.best_iteration = self.assignment.iteration();
        self.best_assignment = Some(self.assignment.snapshot());
        for listener in &self.listeners {
            listener.best_saved(self.best_value, self.best_iteration);
        }
        true
    }

    /// Restores the best-known assignment into the working assignment,
    /// tagging the restoration with `iteration`.
    ///
    /// Panics if no best assignment has ever been saved; callers should
    /// check [`best_assignment`](Self::best_assignment) first.
    pub fn restore_best(&mut self, iteration: u64) {
        let best = self
            .best_assignment
            .clone()
            .expect("restore_best called with no best assignment saved");
        self.assignment.restore_snapshot(iteration, best);
        self.current_value = self.best_value;
        for listener in &self.listeners {
            listener.best_restored(self.best_value, self.best_iteration);
        }
    }
}

impl<V: Variable, M: Model<V> + Debug> Debug for Solution<V, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solution")
            .field("model", &self.model)
            .field("assignment", &self.assignment)
            .field("current_value", &self.current_value)
            .field("best_value", &self.best_value)
            .field("best_iteration", &self.best_iteration)
            .finish()
    }
}
