//! Branch-and-bound per-entity selection (spec §4.7).
//!
//! A representative deep-search neighbourhood for an entity (e.g. a student)
//! that owns a bundle of related requests which must be (re)scheduled
//! jointly: depth-first search over the requests in order, producing a
//! single [`BranchAndBoundNeighbour`] that reassigns all of them at once.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ifs_core::{Assignment, EntityWeights, Model, Neighbour, UniformWeights, Value, Variable, VariableId};

/// One of an entity's requests: a slot that must (or may) be filled with one
/// of several candidate values, contributing to the branch-and-bound
/// objective independently of [`ifs_core::Model::get_total_value`] (spec
/// §4.7's pruning formula works in terms of each request's own exact/lower-
/// bound contribution, not a model-wide recompute per node).
pub trait Request<V: Variable>: Debug {
    /// The variable this request would (re)assign.
    fn variable(&self) -> VariableId;

    /// The request's initial (pre-search) value, if any; tried first when
    /// still feasible (spec §4.7 value ordering, step (a)).
    fn initial_value(&self) -> Option<&V::Value> {
        None
    }

    /// User-preferred candidate values, tried after the initial value (spec
    /// §4.7 value ordering, step (b)).
    fn selected_values(&self) -> &[V::Value] {
        &[]
    }

    /// The full enumerated candidate list, tried last (spec §4.7 value
    /// ordering, step (c)).
    fn enumeration(&self) -> &[V::Value];

    /// True for a backup/alternate request: only counted toward the
    /// assigned total when it is the one actually chosen, and always
    /// eligible to be left unassigned.
    fn is_alternative(&self) -> bool {
        false
    }

    /// True if this request may be left unassigned even though it isn't an
    /// alternative (e.g. a waitlisted course request, spec glossary).
    fn allow_leave_unassigned(&self) -> bool {
        self.is_alternative()
    }

    /// Relative weight of this request toward the "assigned count" primary
    /// objective in [`MinimizePenalty`](BranchAndBoundConfig::minimize_penalty)
    /// mode — course requests weighted 10x, free-time requests 1x in the
    /// original system (spec §4.7).
    fn assigned_weight(&self) -> f64 {
        1.0
    }

    /// The exact penalty contributed by assigning `value` to this request.
    fn penalty(&self, value: &V::Value) -> f64 {
        let _ = value;
        0.0
    }

    /// A lower bound on the penalty this request could still contribute,
    /// used for pruning (spec §4.7: "remaining non-alternative requests
    /// contribute `r.lowerBound()`").
    fn penalty_lower_bound(&self) -> f64 {
        0.0
    }
}

/// Cross-request constraint requiring a consistent choice across several of
/// an entity's requests (spec glossary: "linked sections").
pub trait LinkedSections<V: Variable>: Debug + Send + Sync {
    /// True if adding `candidate` to the values already chosen earlier in
    /// the same search stack (`chosen`) would violate a linkage.
    fn violates(&self, chosen: &[V::Value], candidate: &V::Value) -> bool {
        let _ = (chosen, candidate);
        false
    }
}

/// No linked-section constraints: every combination is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLinkedSections;

impl<V: Variable> LinkedSections<V> for NoLinkedSections {}

/// Checks whether two of an entity's own candidate values overlap in time.
/// Only the entity's own search stack participates in this check — other
/// entities' current assignments are already honored through the model's
/// global constraints (spec §4.7 feasibility note).
pub trait TimeOverlapCheck<V: Variable>: Debug + Send + Sync {
    fn overlaps(&self, a: &V::Value, b: &V::Value) -> bool {
        let _ = (a, b);
        false
    }
}

/// No time-overlap checking: every pair of candidates is allowed to coexist.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTimeOverlapCheck;

impl<V: Variable> TimeOverlapCheck<V> for NoTimeOverlapCheck {}

/// Tuning knobs for [`BranchAndBoundSearch`], corresponding to the
/// `Neighbour.BranchAndBound*` keys (spec §6).
pub struct BranchAndBoundConfig<V: Variable> {
    /// Wall-clock budget for one search call. `None` means unlimited (used
    /// by testable property 6/7, which require `Timeout = infinity`).
    pub timeout: Option<Duration>,
    /// Selects the two-objective (assigned-count-then-penalty) pruning mode
    /// instead of single-objective penalty minimization.
    pub minimize_penalty: bool,
    /// When false, the search explores exhaustively without ever pruning —
    /// used to test pruning soundness (property 7) against the pruned run.
    pub pruning_enabled: bool,
    /// Maximum number of alternative requests counted toward the pruning
    /// bound at once (spec §4.7: "alternatives contribute only if the
    /// running alt slots counter allows them").
    pub max_alternate_slots: usize,
    pub linked_sections: Arc<dyn LinkedSections<V>>,
    pub time_overlap: Arc<dyn TimeOverlapCheck<V>>,
    /// Supplies the per-value weight, distance-conflict weight and
    /// time-overlap weight combined by [`BranchAndBoundSearch::candidate_score`]
    /// (spec §4.7 value ordering, step (c); spec §6's `StudentWeights`
    /// collaborator). Defaults to [`UniformWeights`], which makes the
    /// enumerated tail keep its natural order.
    pub weights: Arc<dyn EntityWeights<V>>,
}

impl<V: Variable> Debug for BranchAndBoundConfig<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchAndBoundConfig")
            .field("timeout", &self.timeout)
            .field("minimize_penalty", &self.minimize_penalty)
            .field("pruning_enabled", &self.pruning_enabled)
            .field("max_alternate_slots", &self.max_alternate_slots)
            .finish()
    }
}

impl<V: Variable> Default for BranchAndBoundConfig<V> {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_millis(10_000)),
            minimize_penalty: false,
            pruning_enabled: true,
            max_alternate_slots: usize::MAX,
            linked_sections: Arc::new(NoLinkedSections),
            time_overlap: Arc::new(NoTimeOverlapCheck),
            weights: Arc::new(UniformWeights),
        }
    }
}

/// Diagnostics from one branch-and-bound call. **Supplemented from
/// `original_source/`**: the original student-sectioning search tracks node
/// count and depth reached for logging; carried forward here since nothing
/// in spec.md's Non-goals excludes diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub nodes_visited: u64,
    pub max_depth_reached: usize,
    pub timeout_reached: bool,
}

/// The neighbour produced by [`BranchAndBoundSearch::search`]: reassigns
/// every request's variable to its newly-found best value (unassigning
/// first), leaving every other entity's assignment untouched.
#[derive(Debug, Clone)]
pub struct BranchAndBoundNeighbour<V: Variable> {
    variables: Vec<VariableId>,
    best: Vec<Option<V::Value>>,
    delta: f64,
}

impl<V: Variable> BranchAndBoundNeighbour<V> {
    fn new(variables: Vec<VariableId>, best: Vec<Option<V::Value>>, delta: f64) -> Self {
        Self {
            variables,
            best,
            delta,
        }
    }

    /// The best value found for each request, in request order (`None` if
    /// that request was left unassigned).
    pub fn best_values(&self) -> &[Option<V::Value>] {
        &self.best
    }
}

impl<V: Variable> Neighbour<V> for BranchAndBoundNeighbour<V> {
    fn value(&self, _assignment: &Assignment<V>) -> f64 {
        self.delta
    }

    fn assign(&self, assignment: &mut Assignment<V>, iteration: u64) {
        for variable in &self.variables {
            assignment.unassign(iteration, *variable);
        }
        for value in self.best.iter().flatten() {
            assignment.assign(iteration, value.clone());
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
struct Score {
    assigned: f64,
    penalty: f64,
}

impl Score {
    const WORST: Self = Self {
        assigned: f64::NEG_INFINITY,
        penalty: f64::INFINITY,
    };

    fn better_than(self, other: Self, minimize_penalty: bool) -> bool {
        if minimize_penalty {
            if self.assigned != other.assigned {
                self.assigned > other.assigned
            } else {
                self.penalty < other.penalty
            }
        } else {
            self.penalty < other.penalty
        }
    }
}

struct SearchState<V: Variable> {
    best_score: Score,
    best_assignment: Vec<Option<V::Value>>,
    stats: SearchStats,
    deadline: Option<Instant>,
}

/// Runs the depth-first branch-and-bound search of spec §4.7 over one
/// entity's ordered request list.
pub struct BranchAndBoundSearch<V: Variable, M: Model<V>> {
    config: BranchAndBoundConfig<V>,
    _model: std::marker::PhantomData<M>,
}

impl<V: Variable, M: Model<V>> Debug for BranchAndBoundSearch<V, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchAndBoundSearch")
            .field("config", &self.config)
            .finish()
    }
}

impl<V: Variable, M: Model<V>> BranchAndBoundSearch<V, M> {
    pub fn new(config: BranchAndBoundConfig<V>) -> Self {
        Self {
            config,
            _model: std::marker::PhantomData,
        }
    }

    /// Searches for the best joint assignment of `requests` against `model`
    /// and `assignment` (which must already have every request's variable
    /// unassigned — other entities' current values are read through `model`'s
    /// global constraints and left untouched).
    pub fn search(
        &self,
        model: &M,
        assignment: &Assignment<V>,
        requests: &[Box<dyn Request<V>>],
    ) -> (BranchAndBoundNeighbour<V>, SearchStats) {
        let variables: Vec<VariableId> = requests.iter().map(|r| r.variable()).collect();
        let mut current: Vec<Option<V::Value>> = vec![None; requests.len()];

        let mut state = SearchState {
            best_score: Score::WORST,
            best_assignment: current.clone(),
            stats: SearchStats::default(),
            deadline: self.config.timeout.map(|d| Instant::now() + d),
        };

        self.dfs(model, assignment, requests, 0, &mut current, Score {
            assigned: 0.0,
            penalty: 0.0,
        }, self.config.max_alternate_slots, &mut state);

        let delta = if state.best_score == Score::WORST {
            0.0
        } else {
            state.best_score.penalty
        };

        (
            BranchAndBoundNeighbour::new(variables, state.best_assignment, delta),
            state.stats,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn dfs(
        &self,
        model: &M,
        assignment: &Assignment<V>,
        requests: &[Box<dyn Request<V>>],
        idx: usize,
        current: &mut Vec<Option<V::Value>>,
        score_so_far: Score,
        alt_slots: usize,
        state: &mut SearchState<V>,
    ) {
        state.stats.nodes_visited += 1;
        state.stats.max_depth_reached = state.stats.max_depth_reached.max(idx);

        if let Some(deadline) = state.deadline {
            if Instant::now() >= deadline {
                state.stats.timeout_reached = true;
                return;
            }
        }

        if self.config.pruning_enabled && idx < requests.len() {
            let bound = Self::remaining_bound(requests, idx, alt_slots, score_so_far);
            if !bound.better_than(state.best_score, self.config.minimize_penalty)
                && state.best_score != Score::WORST
            {
                return;
            }
        }

        if idx == requests.len() {
            if score_so_far.better_than(state.best_score, self.config.minimize_penalty)
                || state.best_score == Score::WORST
            {
                state.best_score = score_so_far;
                state.best_assignment = current.clone();
            }
            return;
        }

        let request = &requests[idx];
        for value in self.ordered_candidates(model, request, assignment, &current[..idx]) {
            if state
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
            {
                state.stats.timeout_reached = true;
                return;
            }
            if !self.is_feasible(model, assignment, &current[..idx], &value) {
                continue;
            }
            current[idx] = Some(value.clone());
            let next_score = Score {
                assigned: score_so_far.assigned + request.assigned_weight(),
                penalty: score_so_far.penalty + request.penalty(&value),
            };
            let next_slots = if request.is_alternative() {
                alt_slots.saturating_sub(1)
            } else {
                alt_slots
            };
            self.dfs(model, assignment, requests, idx + 1, current, next_score, next_slots, state);
            current[idx] = None;
            if state.stats.timeout_reached {
                return;
            }
        }

        if request.allow_leave_unassigned() {
            self.dfs(model, assignment, requests, idx + 1, current, score_so_far, alt_slots, state);
        }
    }

    /// Value ordering (spec §4.7): initial value first, then selected
    /// (preferred) values, then the full enumeration sorted by a combined
    /// weight/conflict score. Duplicate values across the three sources are
    /// only tried once.
    ///
    /// Resolved ambiguity (see DESIGN.md): the spec phrases the combined
    /// ordering criterion as "descending by weight", where `weight` is a
    /// desirability score and the distance/time-overlap contributions are
    /// penalties; this implementation treats the two as opposing terms
    /// (`desirability - penalties`) and still sorts descending, so the most
    /// desirable, least-conflicted candidate is tried first — maximizing
    /// how quickly the search finds a strong incumbent for pruning.
    fn ordered_candidates(
        &self,
        model: &M,
        request: &Box<dyn Request<V>>,
        assignment: &Assignment<V>,
        chosen: &[Option<V::Value>],
    ) -> Vec<V::Value> {
        let push_unique = |value: &V::Value, out: &mut Vec<V::Value>| {
            if !out.iter().any(|existing| existing == value) {
                out.push(value.clone());
            }
        };

        let mut ordered = Vec::new();
        if let Some(initial) = request.initial_value() {
            push_unique(initial, &mut ordered);
        }
        for value in request.selected_values() {
            push_unique(value, &mut ordered);
        }

        let mut rest: Vec<V::Value> = request
            .enumeration()
            .iter()
            .filter(|v| !ordered.iter().any(|existing| existing == *v))
            .cloned()
            .collect();
        let chosen_values: Vec<&V::Value> = chosen.iter().flatten().collect();
        rest.sort_by(|a, b| {
            let score_a = self.candidate_score(model, assignment, &chosen_values, a);
            let score_b = self.candidate_score(model, assignment, &chosen_values, b);
            score_b
                .partial_cmp(&score_a)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ordered.extend(rest);
        ordered
    }

    /// Combined desirability score for sorting the enumerated (non-initial,
    /// non-selected) candidates (spec §4.7 value ordering, step (c)): the
    /// entity's per-value weight minus the distance-conflict and
    /// time-overlap weights the candidate would add against the entity's
    /// already-chosen values in this search stack. Sorted descending, so the
    /// most desirable, least-conflicted candidate is tried first. With the
    /// default [`UniformWeights`] every candidate scores `1.0` and the
    /// enumeration keeps its natural order (a stable sort).
    fn candidate_score(
        &self,
        model: &M,
        assignment: &Assignment<V>,
        _chosen: &[&V::Value],
        value: &V::Value,
    ) -> f64 {
        let variable = model.variable(value.variable_id());
        let base = self.config.weights.weight(variable);
        let distance = self.config.weights.distance_conflict_weight(assignment, value);
        let overlap = self.config.weights.time_overlap_weight(assignment, value);
        base - distance - overlap
    }

    fn is_feasible(
        &self,
        model: &M,
        assignment: &Assignment<V>,
        chosen: &[Option<V::Value>],
        candidate: &V::Value,
    ) -> bool {
        for constraint in model.global_constraints() {
            if !constraint.conflict_values(assignment, candidate).is_empty() {
                return false;
            }
        }
        let chosen_values: Vec<&V::Value> = chosen.iter().flatten().collect();
        let chosen_owned: Vec<V::Value> = chosen_values.iter().map(|v| (*v).clone()).collect();
        if self.config.linked_sections.violates(&chosen_owned, candidate) {
            return false;
        }
        for prior in &chosen_values {
            if self.config.time_overlap.overlaps(prior, candidate) {
                return false;
            }
        }
        true
    }

    fn remaining_bound(
        requests: &[Box<dyn Request<V>>],
        idx: usize,
        alt_slots: usize,
        score_so_far: Score,
    ) -> Score {
        let mut assigned = score_so_far.assigned;
        let mut penalty = score_so_far.penalty;
        let mut slots = alt_slots;
        for request in &requests[idx..] {
            if request.is_alternative() {
                if slots > 0 {
                    assigned += request.assigned_weight();
                    penalty += request.penalty_lower_bound();
                    slots -= 1;
                }
            } else {
                assigned += request.assigned_weight();
                penalty += request.penalty_lower_bound();
            }
        }
        Score { assigned, penalty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifs_core::test_support::{ring, ToyModel, ToyVariable};
    use ifs_core::Model as _;

    #[derive(Debug)]
    struct FixedRequest {
        variable: VariableId,
        enumeration: Vec<ifs_core::test_support::ToyValue>,
        penalties: Vec<f64>,
    }

    impl Request<ToyVariable> for FixedRequest {
        fn variable(&self) -> VariableId {
            self.variable
        }

        fn enumeration(&self) -> &[ifs_core::test_support::ToyValue] {
            &self.enumeration
        }

        fn penalty(&self, value: &ifs_core::test_support::ToyValue) -> f64 {
            self.enumeration
                .iter()
                .position(|v| v == value)
                .map(|i| self.penalties[i])
                .unwrap_or(0.0)
        }

        fn penalty_lower_bound(&self) -> f64 {
            self.penalties.iter().cloned().fold(f64::INFINITY, f64::min)
        }
    }

    fn make_requests(model: &ToyModel) -> Vec<Box<dyn Request<ToyVariable>>> {
        model
            .variables()
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let enumeration = v.values().to_vec();
                let penalties: Vec<f64> = enumeration
                    .iter()
                    .enumerate()
                    .map(|(j, _)| ((i + j) % 3) as f64)
                    .collect();
                Box::new(FixedRequest {
                    variable: v.id(),
                    enumeration,
                    penalties,
                }) as Box<dyn Request<ToyVariable>>
            })
            .collect()
    }

    /// Naive exhaustive enumeration over all request combinations, used as
    /// the oracle for testable property 6.
    fn naive_best(model: &ToyModel, requests: &[Box<dyn Request<ToyVariable>>], assignment: &Assignment<ToyVariable>) -> f64 {
        fn recurse(
            model: &ToyModel,
            requests: &[Box<dyn Request<ToyVariable>>],
            assignment: &Assignment<ToyVariable>,
            idx: usize,
            chosen: &mut Vec<Option<ifs_core::test_support::ToyValue>>,
            running_penalty: f64,
            best: &mut f64,
        ) {
            if idx == requests.len() {
                *best = best.min(running_penalty);
                return;
            }
            let request = &requests[idx];
            for value in request.enumeration() {
                let mut ok = true;
                for gc in model.global_constraints() {
                    if !gc.conflict_values(assignment, value).is_empty() {
                        ok = false;
                        break;
                    }
                }
                if ok {
                    chosen.push(Some(value.clone()));
                    recurse(model, requests, assignment, idx + 1, chosen, running_penalty + request.penalty(value), best);
                    chosen.pop();
                }
            }
            if request.allow_leave_unassigned() {
                chosen.push(None);
                recurse(model, requests, assignment, idx + 1, chosen, running_penalty, best);
                chosen.pop();
            }
        }

        let mut best = f64::INFINITY;
        let mut chosen = Vec::new();
        recurse(model, requests, assignment, 0, &mut chosen, 0.0, &mut best);
        best
    }

    /// Property 6: with pruning disabled and an unlimited timeout, B&B
    /// matches naive enumeration's optimum.
    #[test]
    fn matches_naive_enumeration_when_unpruned() {
        let model = ring(4, 2);
        let assignment = model.new_assignment();
        let requests = make_requests(&model);

        let config = BranchAndBoundConfig {
            timeout: None,
            pruning_enabled: false,
            ..BranchAndBoundConfig::default()
        };
        let search: BranchAndBoundSearch<ToyVariable, ToyModel> = BranchAndBoundSearch::new(config);
        let (neighbour, stats) = search.search(&model, &assignment, &requests);
        assert!(!stats.timeout_reached);

        let expected = naive_best(&model, &requests, &assignment);
        assert!((neighbour.value(&assignment) - expected).abs() < 1e-9);
    }

    /// Property 7: pruning enabled vs. disabled return the same optimum.
    #[test]
    fn pruned_search_matches_unpruned_result() {
        let model = ring(4, 2);
        let assignment = model.new_assignment();
        let requests_a = make_requests(&model);
        let requests_b = make_requests(&model);

        let unpruned_config = BranchAndBoundConfig {
            timeout: None,
            pruning_enabled: false,
            ..BranchAndBoundConfig::default()
        };
        let pruned_config = BranchAndBoundConfig {
            timeout: None,
            pruning_enabled: true,
            ..BranchAndBoundConfig::default()
        };
        let unpruned: BranchAndBoundSearch<ToyVariable, ToyModel> = BranchAndBoundSearch::new(unpruned_config);
        let pruned: BranchAndBoundSearch<ToyVariable, ToyModel> = BranchAndBoundSearch::new(pruned_config);

        let (a, _) = unpruned.search(&model, &assignment, &requests_a);
        let (b, _) = pruned.search(&model, &assignment, &requests_b);
        assert!((a.value(&assignment) - b.value(&assignment)).abs() < 1e-9);
    }

    /// S5: an exponential search space under a 10ms timeout returns a
    /// non-null best-so-far with `timeout_reached` set.
    #[test]
    fn reports_timeout_on_large_search_space() {
        let model = ring(20, 6);
        let assignment = model.new_assignment();
        let requests = make_requests(&model);

        let config = BranchAndBoundConfig {
            timeout: Some(Duration::from_millis(10)),
            pruning_enabled: false,
            ..BranchAndBoundConfig::default()
        };
        let search: BranchAndBoundSearch<ToyVariable, ToyModel> = BranchAndBoundSearch::new(config);
        let (_neighbour, stats) = search.search(&model, &assignment, &requests);
        assert!(stats.timeout_reached);
        assert!(stats.nodes_visited > 0);
    }

    /// Value ordering (spec §4.7, step (c)): the enumerated tail is sorted
    /// descending by `weight - distance_conflict - time_overlap`, so a
    /// candidate with a heavy time-overlap weight sorts after one without.
    #[test]
    fn ordered_candidates_sorts_enumeration_by_entity_weights() {
        #[derive(Debug)]
        struct PenalizeOddColours;
        impl EntityWeights<ToyVariable> for PenalizeOddColours {
            fn weight(&self, _variable: &ToyVariable) -> f64 {
                1.0
            }
            fn time_overlap_weight(
                &self,
                _assignment: &Assignment<ToyVariable>,
                value: &ifs_core::test_support::ToyValue,
            ) -> f64 {
                if value.colour % 2 == 1 {
                    10.0
                } else {
                    0.0
                }
            }
        }

        let model = ring(4, 4);
        let assignment = model.new_assignment();
        let requests = make_requests(&model);

        let config = BranchAndBoundConfig {
            weights: Arc::new(PenalizeOddColours),
            ..BranchAndBoundConfig::default()
        };
        let search: BranchAndBoundSearch<ToyVariable, ToyModel> = BranchAndBoundSearch::new(config);
        let ordered = search.ordered_candidates(&model, &requests[0], &assignment, &[]);

        let first_odd = ordered.iter().position(|v| v.colour % 2 == 1);
        let first_even = ordered.iter().position(|v| v.colour % 2 == 0);
        assert!(
            first_even < first_odd,
            "even-coloured (unpenalized) candidates should sort before odd-coloured ones: {ordered:?}"
        );
    }
}
