//! Great deluge acceptor with idle/rebound handling (spec §4.5).

use std::fmt::Debug;

use ifs_core::{Model, Neighbour, Variable};

use super::NeighbourSelection;
use crate::scope::SearchContext;

/// Wraps an inner [`NeighbourSelection`]. Accepts a proposal if it improves
/// the objective outright, or if the resulting total value is at or below
/// the current water level (bound) — `n.value() <= 0 || currentTotal +
/// n.value() <= bound` (spec §4.5), so an improving move is never rejected
/// just because the water level has already dropped below the current
/// total.
///
/// Follows spec §4.5's formulas exactly:
/// - **Seed**: `bound = UpperBoundRate * bestValue`, computed lazily from the
///   first call's best-known value.
/// - **Decay**: every call, `bound *= CoolRate`, tightening the level toward
///   the best-known value so the search is squeezed toward convergence.
/// - **Idle/rebound**: after decay, if `bound < LowerBoundRate^(1+idleCount)
///   * bestValue` — the level has dropped so far below the best-known value
///   that almost nothing can meet it any more — `idleCount` increments and
///   the bound is loosened back up to `max(bestValue + 2.0,
///   UpperBoundRate^idleCount * bestValue)`. `idleCount` resets to zero the
///   moment the best-known value strictly improves.
///
/// `lower_bound_rate` is intentionally a small fraction (default far below
/// 1.0): with an aggressive `cool_rate` the bound can fall well below the
/// best-known value within a handful of calls even though the search is
/// still making progress, and a `lower_bound_rate` close to 1.0 would
/// rebound almost immediately on every run. See `DESIGN.md` for the worked
/// example (this is the resolution of an ambiguity in the source material:
/// the rebound trigger and the decay formula are stated independently, but
/// only the combination of an aggressive `cool_rate` with a permissive
/// `lower_bound_rate` reproduces the reference decay trace without an
/// unwanted early rebound).
pub struct GreatDelugeSelection<V: Variable, M: Model<V>> {
    inner: Box<dyn NeighbourSelection<V, M>>,
    cool_rate: f64,
    upper_bound_rate: f64,
    lower_bound_rate: f64,
    bound: Option<f64>,
    idle_count: u32,
    last_best_value: Option<f64>,
}

impl<V: Variable, M: Model<V>> Debug for GreatDelugeSelection<V, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreatDelugeSelection")
            .field("cool_rate", &self.cool_rate)
            .field("upper_bound_rate", &self.upper_bound_rate)
            .field("lower_bound_rate", &self.lower_bound_rate)
            .field("bound", &self.bound)
            .finish()
    }
}

impl<V: Variable, M: Model<V>> GreatDelugeSelection<V, M> {
    pub fn new(
        inner: Box<dyn NeighbourSelection<V, M>>,
        cool_rate: f64,
        upper_bound_rate: f64,
        lower_bound_rate: f64,
    ) -> Self {
        Self {
            inner,
            cool_rate,
            upper_bound_rate,
            lower_bound_rate,
            bound: None,
            idle_count: 0,
            last_best_value: None,
        }
    }

    /// Decays the bound toward `best_value` by `cool_rate`. Exposed
    /// separately from idle/rebound tracking so the pure decay arithmetic is
    /// unit-testable in isolation (spec scenario S4).
    fn decay(&mut self, best_value: f64) -> f64 {
        let bound = self
            .bound
            .get_or_insert_with(|| self.upper_bound_rate * best_value);
        *bound *= self.cool_rate;
        *bound
    }

    /// Resets the idle counter on improvement, otherwise loosens the bound
    /// if it has fallen below the current lower threshold.
    fn track(&mut self, best_value: f64) {
        let improved = match self.last_best_value {
            None => true,
            Some(last) => best_value < last,
        };
        self.last_best_value = Some(best_value);
        if improved {
            self.idle_count = 0;
            return;
        }

        let bound = *self.bound.get_or_insert(self.upper_bound_rate * best_value);
        let threshold = self.lower_bound_rate.powi(1 + self.idle_count as i32) * best_value;
        if bound < threshold {
            self.idle_count += 1;
            let rebounded = (best_value + 2.0).max(self.upper_bound_rate.powi(self.idle_count as i32) * best_value);
            tracing::debug!(from = bound, to = rebounded, idle_count = self.idle_count, "great deluge rebound");
            self.bound = Some(rebounded);
        }
    }
}

impl<V: Variable, M: Model<V>> NeighbourSelection<V, M> for GreatDelugeSelection<V, M> {
    fn select_neighbour(
        &mut self,
        context: &mut SearchContext<V, M>,
    ) -> Option<Box<dyn Neighbour<V>>> {
        let best_value = context.solution().best_value();
        let bound = self.decay(best_value);
        self.track(best_value);

        let neighbour = self.inner.select_neighbour(context)?;
        let delta = neighbour.value(context.solution().assignment());
        let current_value = context.solution().current_value();
        let candidate_value = current_value + delta;

        if delta <= 0.0 || candidate_value <= bound {
            Some(neighbour)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::selector::{
        RandomValueSelection, StandardNeighbourSelection, UnassignedFirstVariableSelection,
    };
    use ifs_core::test_support::triangle;
    use ifs_core::Solution;

    #[test]
    fn rejects_moves_far_above_water_level() {
        let model = triangle(3);
        let assignment = model.new_assignment();
        let mut context = SearchContext::new(Solution::new(model, assignment));
        let inner = Box::new(StandardNeighbourSelection::new(
            Box::new(UnassignedFirstVariableSelection),
            Box::new(RandomValueSelection),
        ));
        let mut deluge = GreatDelugeSelection::new(inner, 0.999, 1.05, 0.001);
        // With a zero-penalty toy model every proposal has delta 0, so it
        // should always be at or below whatever bound gets seeded.
        let selected = deluge.select_neighbour(&mut context);
        assert!(selected.is_some());
    }

    /// S4: with UpperBoundRate=1.05, CoolRate=0.5 and bestValue pinned at
    /// 100 (no improving moves accepted), the bound decays to
    /// 105 * 0.5^3 = 13.125 after three calls. `lower_bound_rate` is chosen
    /// small enough that the rebound check never fires during this trace,
    /// isolating the pure decay arithmetic.
    #[test]
    fn bound_decays_per_cool_rate_without_rebound() {
        let mut deluge: GreatDelugeSelection<
            ifs_core::test_support::ToyVariable,
            ifs_core::test_support::ToyModel,
        > = GreatDelugeSelection::new(
            Box::new(StandardNeighbourSelection::new(
                Box::new(UnassignedFirstVariableSelection),
                Box::new(RandomValueSelection),
            )),
            0.5,
            1.05,
            1.0e-6,
        );
        let best_value = 100.0;
        let mut bound = 0.0;
        for _ in 0..3 {
            bound = deluge.decay(best_value);
            deluge.track(best_value);
        }
        assert!((bound - 13.125).abs() < 1e-9, "bound was {bound}");
    }

    /// With a `lower_bound_rate` close to 1.0, the bound rebounds upward
    /// once it falls below (nearly) the best-known value, instead of
    /// continuing to tighten forever.
    #[test]
    fn rebounds_once_bound_falls_below_lower_threshold() {
        let mut deluge: GreatDelugeSelection<
            ifs_core::test_support::ToyVariable,
            ifs_core::test_support::ToyModel,
        > = GreatDelugeSelection::new(
            Box::new(StandardNeighbourSelection::new(
                Box::new(UnassignedFirstVariableSelection),
                Box::new(RandomValueSelection),
            )),
            0.9,
            1.05,
            0.98,
        );
        let best_value = 100.0;
        let mut bound = 0.0;
        for _ in 0..20 {
            bound = deluge.decay(best_value);
            deluge.track(best_value);
        }
        assert!(deluge.idle_count > 0, "expected at least one rebound");
        assert!(bound > best_value, "bound should have rebounded above best value, was {bound}");
    }
}
