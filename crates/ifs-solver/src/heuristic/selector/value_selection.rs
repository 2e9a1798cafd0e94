//! Policies for picking which value to try for a chosen variable.

use std::fmt::Debug;

use ifs_core::{Assignment, EntityWeights, Model, Variable, VariableId};
use rand::seq::SliceRandom;

use crate::scope::SearchContext;

/// Picks a candidate value for `variable` out of its domain.
///
/// Returning `None` means this policy found nothing worth trying this
/// iteration (e.g. every value is already assigned elsewhere and the policy
/// declines to force a conflict) — the caller should treat that the same as
/// a standard-selection iteration that produced no neighbour.
pub trait ValueSelection<V: Variable, M: Model<V>>: Debug + Send {
    fn select_value(
        &mut self,
        context: &mut SearchContext<V, M>,
        variable: VariableId,
    ) -> Option<V::Value>;
}

/// Picks uniformly at random among a variable's domain, excluding its
/// current value if one is assigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomValueSelection;

impl<V: Variable, M: Model<V>> ValueSelection<V, M> for RandomValueSelection {
    fn select_value(
        &mut self,
        context: &mut SearchContext<V, M>,
        variable: VariableId,
    ) -> Option<V::Value> {
        let current = context.solution().assignment().get_value(variable).cloned();
        let candidates: Vec<V::Value> = context
            .solution()
            .model()
            .variable(variable)
            .values()
            .iter()
            .filter(|v| Some(*v) != current.as_ref())
            .cloned()
            .collect();
        let rng = context.rng();
        candidates.choose(rng).cloned()
    }
}

/// Like [`RandomValueSelection`], but draws values with probability
/// proportional to `1 / weight`, so that low-weight ("cheap to disturb")
/// entities are tried more often than high-weight ones (spec §4.2's
/// weighted neighbourhood variant).
pub struct WeightedRandomValueSelection<V: Variable, M: Model<V>> {
    weights: Box<dyn EntityWeights<V>>,
    _phantom: std::marker::PhantomData<fn(&M)>,
}

impl<V: Variable, M: Model<V>> Debug for WeightedRandomValueSelection<V, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedRandomValueSelection").finish()
    }
}

impl<V: Variable, M: Model<V>> WeightedRandomValueSelection<V, M> {
    pub fn new(weights: Box<dyn EntityWeights<V>>) -> Self {
        Self {
            weights,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<V: Variable, M: Model<V>> ValueSelection<V, M> for WeightedRandomValueSelection<V, M> {
    fn select_value(
        &mut self,
        context: &mut SearchContext<V, M>,
        variable: VariableId,
    ) -> Option<V::Value> {
        let current = context.solution().assignment().get_value(variable).cloned();
        let var = context.solution().model().variable(variable);
        let weight = self.weights.weight(var).max(f64::EPSILON);
        let candidates: Vec<V::Value> = var
            .values()
            .iter()
            .filter(|v| Some(*v) != current.as_ref())
            .cloned()
            .collect();
        if candidates.is_empty() {
            return None;
        }
        // Lower weight => higher selection probability; implemented as a
        // plain weighted pick over the reciprocal rather than pulling in a
        // full weighted-sampling distribution for what is at most a handful
        // of candidates per call.
        let rng = context.rng();
        let inverse = 1.0 / weight;
        let total: f64 = candidates.len() as f64 * inverse;
        let mut roll = rand::Rng::random::<f64>(rng) * total;
        for candidate in &candidates {
            roll -= inverse;
            if roll <= 0.0 {
                return Some(candidate.clone());
            }
        }
        candidates.last().cloned()
    }
}

/// Default value-selection policy (spec §4.2 step 2): "weighted sum of
/// placement criteria; lower weighted score is better; ties broken
/// randomly."
///
/// The placement criteria are the three contributions [`EntityWeights`]
/// exposes for a candidate value: the number of values it would displace
/// (weighted by each displaced entity's own `weight`, since bumping a
/// heavily-weighted entity out of its slot is worse than bumping a cheap
/// one), plus the candidate's own `distance_conflict_weight` and
/// `time_overlap_weight`. The candidate(s) with the lowest total score win;
/// ties are broken randomly.
pub struct WeightedMinimumValueSelection<V: Variable, M: Model<V>> {
    weights: Box<dyn EntityWeights<V>>,
    _phantom: std::marker::PhantomData<fn(&M)>,
}

impl<V: Variable, M: Model<V>> Debug for WeightedMinimumValueSelection<V, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedMinimumValueSelection").finish()
    }
}

impl<V: Variable, M: Model<V>> WeightedMinimumValueSelection<V, M> {
    pub fn new(weights: Box<dyn EntityWeights<V>>) -> Self {
        Self {
            weights,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Sum of the criteria described on the type, lower is better.
    fn score(&self, model: &M, assignment: &Assignment<V>, candidate: &V::Value) -> f64 {
        let displaced: f64 = model
            .conflict_values(assignment, candidate)
            .iter()
            .map(|conflict| self.weights.weight(model.variable(conflict.variable_id())))
            .sum();
        let distance = self.weights.distance_conflict_weight(assignment, candidate);
        let overlap = self.weights.time_overlap_weight(assignment, candidate);
        displaced + distance + overlap
    }
}

impl<V: Variable, M: Model<V>> ValueSelection<V, M> for WeightedMinimumValueSelection<V, M> {
    fn select_value(
        &mut self,
        context: &mut SearchContext<V, M>,
        variable: VariableId,
    ) -> Option<V::Value> {
        let solution = context.solution();
        let model = solution.model();
        let assignment = solution.assignment();
        let current = assignment.get_value(variable).cloned();

        let mut best: Vec<V::Value> = Vec::new();
        let mut best_score = f64::INFINITY;
        for candidate in model.variable(variable).values() {
            if Some(candidate) == current.as_ref() {
                continue;
            }
            let score = self.score(model, assignment, candidate);
            if score < best_score {
                best_score = score;
                best.clear();
                best.push(candidate.clone());
            } else if score == best_score {
                best.push(candidate.clone());
            }
        }
        if best.is_empty() {
            return None;
        }

        let rng = context.rng();
        best.choose(rng).cloned()
    }
}
