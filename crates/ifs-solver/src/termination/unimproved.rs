//! Termination conditions based on lack of improvement in the best value.

use std::cell::Cell;
use std::time::{Duration, Instant};

use ifs_core::{Model, Variable};

use super::Termination;
use crate::scope::SearchContext;

/// Terminates once `limit` iterations have passed since the best value last
/// improved.
#[derive(Debug)]
pub struct UnimprovedIterationTermination {
    limit: u64,
    last_best_iteration: Cell<u64>,
}

impl UnimprovedIterationTermination {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            last_best_iteration: Cell::new(0),
        }
    }
}

impl<V: Variable, M: Model<V>> Termination<V, M> for UnimprovedIterationTermination {
    fn is_terminated(&self, context: &SearchContext<V, M>) -> bool {
        let best_iteration = context.solution().best_iteration();
        if best_iteration > self.last_best_iteration.get() {
            self.last_best_iteration.set(best_iteration);
        }
        context.iteration().saturating_sub(self.last_best_iteration.get()) >= self.limit
    }
}

/// Terminates once `limit` wall-clock time has passed since the best value
/// last improved.
#[derive(Debug)]
pub struct UnimprovedTimeTermination {
    limit: Duration,
    last_best_value: Cell<Option<f64>>,
    last_improvement: Cell<Option<Instant>>,
}

impl UnimprovedTimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            last_best_value: Cell::new(None),
            last_improvement: Cell::new(None),
        }
    }

    pub fn seconds(secs: f64) -> Self {
        Self::new(Duration::from_secs_f64(secs.max(0.0)))
    }
}

impl<V: Variable, M: Model<V>> Termination<V, M> for UnimprovedTimeTermination {
    fn is_terminated(&self, context: &SearchContext<V, M>) -> bool {
        let now = Instant::now();
        let current_best = context.solution().best_value();

        let improved = match self.last_best_value.get() {
            None => true,
            Some(last) => current_best < last,
        };
        if improved {
            self.last_best_value.set(Some(current_best));
            self.last_improvement.set(Some(now));
            return false;
        }

        self.last_improvement
            .get()
            .is_some_and(|t| now.duration_since(t) >= self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifs_core::test_support::triangle;
    use ifs_core::Solution;

    #[test]
    fn terminates_after_iterations_without_improvement() {
        let model = triangle(3);
        let assignment = model.new_assignment();
        let context = SearchContext::new(Solution::new(model, assignment));
        let term = UnimprovedIterationTermination::new(5);
        assert!(!Termination::is_terminated(&term, &context));
    }
}
