//! Wall-clock termination.

use std::time::Duration;

use ifs_core::{Model, Variable};

use super::Termination;
use crate::scope::SearchContext;

/// Terminates once the configured duration has elapsed since the search
/// started.
///
/// Corresponds to the `Termination.StopTime` property (spec §6); a search
/// with no time limit simply never constructs one of these.
#[derive(Debug, Clone)]
pub struct TimeTermination {
    limit: Duration,
}

impl TimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn seconds(secs: f64) -> Self {
        Self::new(Duration::from_secs_f64(secs.max(0.0)))
    }
}

impl<V: Variable, M: Model<V>> Termination<V, M> for TimeTermination {
    fn is_terminated(&self, context: &SearchContext<V, M>) -> bool {
        context.elapsed().is_some_and(|elapsed| elapsed >= self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifs_core::test_support::triangle;
    use ifs_core::Solution;

    #[test]
    fn terminates_after_elapsed_exceeds_limit() {
        let model = triangle(3);
        let assignment = model.new_assignment();
        let mut context = SearchContext::new(Solution::new(model, assignment));
        let term = TimeTermination::new(Duration::from_millis(0));
        assert!(!term.is_terminated(&context));
        context.start();
        std::thread::sleep(Duration::from_millis(5));
        assert!(term.is_terminated(&context));
    }
}
