//! The composite "simple search" controller (spec §4.6): runs a sequence of
//! phases, each a [`NeighbourSelection`], advancing when a phase's own
//! completion rule fires rather than on an externally-polled termination.
//!
//! The phase table (spec §4.6): construction (optional) → standard IFS →
//! hill climbing → annealing/deluge → terminal. Two per-phase rules decide
//! when to advance, matching the table's "advance condition" column exactly:
//!
//! - `advance_when_complete`: checked *before* calling the phase's
//!   selection — if the working assignment is already complete, the phase
//!   is done without the selection ever being asked. This is what lets a
//!   phase "fall through" into the next one within the same
//!   `select_neighbour` call (spec §9's open question: the original's
//!   fall-through `switch` is preserved here as an explicit loop rather than
//!   implicit fall-through).
//! - `advance_on_none`: if the selection returns `None`, treat that as the
//!   phase signalling it is done (construction giving up, the hill climber
//!   hitting its idle limit) rather than as an idle tick to retry next call.

use std::fmt::Debug;
use std::sync::Arc;

use ifs_core::{AssignmentContextProvider, Model, Neighbour, Variable};

use super::NeighbourSelection;
use crate::event::PhaseLifecycleListener;
use crate::scope::SearchContext;

/// One stage of a [`SimpleSearch`].
pub struct Phase<V: Variable, M: Model<V>> {
    name: String,
    selection: Box<dyn NeighbourSelection<V, M>>,
    advance_when_complete: bool,
    advance_on_none: bool,
}

impl<V: Variable, M: Model<V>> Phase<V, M> {
    pub fn new(
        name: impl Into<String>,
        selection: Box<dyn NeighbourSelection<V, M>>,
        advance_when_complete: bool,
        advance_on_none: bool,
    ) -> Self {
        Self {
            name: name.into(),
            selection,
            advance_when_complete,
            advance_on_none,
        }
    }
}

/// Per-assignment state: which phase is active, and which phase index was
/// last announced to [`PhaseLifecycleListener`]s (so a phase is announced
/// exactly once, even though `select_neighbour` may revisit its index many
/// times before it ends).
#[derive(Default)]
struct PhaseState {
    index: usize,
    announced: Option<usize>,
}

/// Runs each configured [`Phase`] in order, advancing per spec §4.6's table.
///
/// Phase progress is stored in an [`AssignmentContextProvider`] rather than
/// a plain field, so one configured `SimpleSearch` can drive several
/// concurrent assignments (parallel restarts, spec §5) without their phase
/// counters colliding.
pub struct SimpleSearch<V: Variable, M: Model<V>> {
    phases: Vec<Phase<V, M>>,
    states: AssignmentContextProvider<PhaseState>,
    listeners: Vec<Arc<dyn PhaseLifecycleListener>>,
    hill_climb_phase: Option<usize>,
}

impl<V: Variable, M: Model<V>> Debug for SimpleSearch<V, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleSearch")
            .field("phases", &self.phases.iter().map(|p| &p.name).collect::<Vec<_>>())
            .finish()
    }
}

impl<V: Variable, M: Model<V>> SimpleSearch<V, M> {
    pub fn new(phases: Vec<Phase<V, M>>) -> Self {
        Self {
            phases,
            states: AssignmentContextProvider::new(),
            listeners: Vec::new(),
            hill_climb_phase: None,
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn PhaseLifecycleListener>) {
        self.listeners.push(listener);
    }

    /// Marks `index` as the hill-climbing phase, consulted by
    /// [`NeighbourSelection::finalize`] to run a final polishing sweep once
    /// the overall search ends.
    pub fn with_hill_climb_phase(mut self, index: usize) -> Self {
        self.hill_climb_phase = Some(index);
        self
    }

    /// The phase index currently active for this context's assignment.
    pub fn current_phase_index(&mut self, context: &mut SearchContext<V, M>) -> usize {
        self.states.get_or_create(context.solution().assignment()).index
    }

    fn announce_if_needed(&mut self, context: &mut SearchContext<V, M>, index: usize) {
        let already_announced = self
            .states
            .get_or_create(context.solution().assignment())
            .announced
            == Some(index);
        if already_announced {
            return;
        }
        self.states
            .get_or_create(context.solution().assignment())
            .announced = Some(index);
        let name = self.phases[index].name.clone();
        for listener in &self.listeners {
            listener.phase_started(index, &name);
        }
    }

    /// Ends phase `index`: notifies listeners and advances the stored index.
    fn finish_phase(&mut self, context: &mut SearchContext<V, M>, index: usize) {
        let name = self.phases[index].name.clone();
        for listener in &self.listeners {
            listener.phase_ended(index, &name, false);
        }
        self.states.get_or_create(context.solution().assignment()).index = index + 1;
    }
}

impl<V: Variable, M: Model<V>> NeighbourSelection<V, M> for SimpleSearch<V, M> {
    fn select_neighbour(
        &mut self,
        context: &mut SearchContext<V, M>,
    ) -> Option<Box<dyn Neighbour<V>>> {
        if self.phases.is_empty() {
            return None;
        }

        loop {
            let index = self.current_phase_index(context);
            if index >= self.phases.len() {
                return None;
            }
            self.announce_if_needed(context, index);

            if self.phases[index].advance_when_complete && context.solution().assignment().is_complete()
            {
                self.finish_phase(context, index);
                continue;
            }

            let advance_on_none = self.phases[index].advance_on_none;
            match self.phases[index].selection.select_neighbour(context) {
                Some(neighbour) => return Some(neighbour),
                None if advance_on_none => {
                    self.finish_phase(context, index);
                    continue;
                }
                None => return None,
            }
        }
    }

    /// Runs a bounded final sweep of the hill-climbing phase (if one was
    /// registered via [`with_hill_climb_phase`](Self::with_hill_climb_phase))
    /// over the working assignment, applying every improving move it finds.
    /// This both selects *and* applies, unlike the main loop's split,
    /// because there is no outer [`crate::solver::Solver`] call left to do
    /// so once the overall search has already terminated.
    fn finalize(&mut self, context: &mut SearchContext<V, M>) {
        let Some(index) = self.hill_climb_phase else {
            return;
        };
        if index >= self.phases.len() {
            return;
        }
        const MAX_POLISH_STEPS: u32 = 10_000;
        for _ in 0..MAX_POLISH_STEPS {
            let Some(neighbour) = self.phases[index].selection.select_neighbour(context) else {
                break;
            };
            let iteration = context.next_iteration();
            neighbour.assign(context.solution_mut().assignment_mut(), iteration);
            context.solution_mut().recompute_current_value();
            context.solution_mut().save_best_if_improved();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::selector::{RandomValueSelection, StandardNeighbourSelection, UnassignedFirstVariableSelection};
    use ifs_core::test_support::{triangle, ToyModel, ToyVariable};
    use ifs_core::Solution;

    fn standard_ifs() -> Box<dyn NeighbourSelection<ToyVariable, ToyModel>> {
        Box::new(StandardNeighbourSelection::new(
            Box::new(UnassignedFirstVariableSelection),
            Box::new(RandomValueSelection),
        ))
    }

    fn drive(search: &mut SimpleSearch<ToyVariable, ToyModel>, context: &mut SearchContext<ToyVariable, ToyModel>) {
        for _ in 0..20 {
            if let Some(neighbour) = search.select_neighbour(context) {
                let iteration = context.next_iteration();
                neighbour.assign(context.solution_mut().assignment_mut(), iteration);
                context.solution_mut().recompute_current_value();
            }
            if context.solution().assignment().is_complete() {
                break;
            }
        }
    }

    /// S1: a tiny unconstrained model completes within a handful of
    /// iterations when the only configured phase is IFS.
    #[test]
    fn completes_a_small_model_via_ifs_phase() {
        let model = triangle(3);
        let assignment = model.new_assignment();
        let mut context = SearchContext::new(Solution::new(model, assignment));
        let mut search = SimpleSearch::new(vec![Phase::new("ifs", standard_ifs(), true, false)]);
        drive(&mut search, &mut context);
        assert!(context.solution().assignment().is_complete());
    }

    /// S6: with construction disabled, phase advances to IFS immediately,
    /// then IFS → hill-climbing once all variables are assigned.
    #[test]
    fn advances_phase_once_assignment_completes() {
        let model = triangle(3);
        let assignment = model.new_assignment();
        let mut context = SearchContext::new(Solution::new(model, assignment));
        let mut search = SimpleSearch::new(vec![
            Phase::new("ifs", standard_ifs(), true, false),
            Phase::new("hill-climbing", standard_ifs(), false, true),
        ]);
        drive(&mut search, &mut context);
        assert!(context.solution().assignment().is_complete());
        assert_eq!(
            search.current_phase_index(&mut context),
            1,
            "phase should have advanced past IFS once complete"
        );
    }

    #[test]
    fn returns_none_once_every_phase_is_exhausted() {
        let model = triangle(3);
        let assignment = model.new_assignment();
        let mut context = SearchContext::new(Solution::new(model, assignment));

        #[derive(Debug)]
        struct NeverSelects;
        impl NeighbourSelection<ToyVariable, ToyModel> for NeverSelects {
            fn select_neighbour(
                &mut self,
                _context: &mut SearchContext<ToyVariable, ToyModel>,
            ) -> Option<Box<dyn Neighbour<ToyVariable>>> {
                None
            }
        }

        // A phase that always declines and always advances on `None` ends
        // immediately; with no further phases the whole search is done.
        let mut search = SimpleSearch::new(vec![Phase::new("only", Box::new(NeverSelects), false, true)]);
        assert!(search.select_neighbour(&mut context).is_none());
        assert!(search.select_neighbour(&mut context).is_none());
    }
}
