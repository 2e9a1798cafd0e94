//! Per-assignment mutable state for components that would otherwise need a
//! process-global.

use std::collections::HashMap;

use super::assignment::{Assignment, AssignmentId};
use super::variable::Variable;

/// A side table of per-assignment state, keyed by [`AssignmentId`].
///
/// Components that need mutable state scoped to one assignment (a phase
/// counter, an iteration accumulator, a cached statistic) but that are
/// themselves reused across several concurrent assignments — e.g. the same
/// [`crate::neighbour::Neighbour`] selection driving several parallel
/// restarts — obtain their state through a provider like this one instead of
/// holding it directly. This is the Rust analogue of a vector indexed by a
/// small integer assignment-id (see DESIGN.md); a `HashMap` is used instead
/// of a raw vector since assignment ids are process-wide and sparse once
/// restarts tear assignments down.
pub struct AssignmentContextProvider<C: Default> {
    contexts: HashMap<AssignmentId, C>,
}

impl<C: Default> AssignmentContextProvider<C> {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self {
            contexts: HashMap::new(),
        }
    }

    /// Returns this assignment's context, creating it with `C::default()` on
    /// first access.
    pub fn get_or_create<V: Variable>(&mut self, assignment: &Assignment<V>) -> &mut C {
        self.contexts.entry(assignment.id()).or_default()
    }

    /// Tears down the context associated with `assignment`, if one exists.
    ///
    /// Callers that dispose of an `Assignment` (e.g. a finished parallel
    /// restart) should call this to release its state; nothing does so
    /// automatically, since a provider has no way to observe an
    /// `Assignment`'s drop.
    pub fn remove<V: Variable>(&mut self, assignment: &Assignment<V>) -> Option<C> {
        self.contexts.remove(&assignment.id())
    }

    /// Number of live contexts currently tracked.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// True if no contexts are currently tracked.
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl<C: Default> Default for AssignmentContextProvider<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::variable::VariableId;

    #[derive(Debug, Clone, PartialEq)]
    struct V;
    #[derive(Debug, Clone, PartialEq)]
    struct T;
    impl Variable for V {
        type Value = T;
        fn id(&self) -> VariableId {
            VariableId::new(0)
        }
        fn ordering_index(&self) -> usize {
            0
        }
        fn values(&self) -> &[T] {
            &[]
        }
    }
    impl super::super::variable::Value for T {
        type Variable = V;
        fn variable_id(&self) -> VariableId {
            VariableId::new(0)
        }
    }

    #[derive(Default)]
    struct Counter(u32);

    #[test]
    fn lazily_creates_and_reuses_context() {
        let a = Assignment::<V>::new(vec![VariableId::new(0)]);
        let mut provider = AssignmentContextProvider::<Counter>::new();
        provider.get_or_create(&a).0 += 1;
        provider.get_or_create(&a).0 += 1;
        assert_eq!(provider.get_or_create(&a).0, 2);
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn distinct_assignments_get_distinct_contexts() {
        let a = Assignment::<V>::new(vec![VariableId::new(0)]);
        let b = Assignment::<V>::new(vec![VariableId::new(0)]);
        let mut provider = AssignmentContextProvider::<Counter>::new();
        provider.get_or_create(&a).0 = 5;
        provider.get_or_create(&b).0 = 9;
        assert_eq!(provider.get_or_create(&a).0, 5);
        assert_eq!(provider.get_or_create(&b).0, 9);
    }

    #[test]
    fn remove_tears_down_context() {
        let a = Assignment::<V>::new(vec![VariableId::new(0)]);
        let mut provider = AssignmentContextProvider::<Counter>::new();
        provider.get_or_create(&a).0 = 3;
        assert!(provider.remove(&a).is_some());
        assert!(provider.is_empty());
    }
}
