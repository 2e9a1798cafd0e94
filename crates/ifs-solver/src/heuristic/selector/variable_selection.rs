//! Policies for picking which variable to reassign next.

use std::cmp::Ordering;
use std::fmt::Debug;

use ifs_core::{Model, Variable, VariableId};
use rand::seq::SliceRandom;

use crate::scope::SearchContext;

/// Picks the next variable to (re)assign.
///
/// Called once per standard-neighbourhood iteration (spec §4.2); returns
/// `None` only when the model has no variables at all to choose from (an
/// empty domain set), since unlike value selection there is always *some*
/// variable to consider reassigning.
pub trait VariableSelection<V: Variable, M: Model<V>>: Debug + Send {
    fn select_variable(&mut self, context: &mut SearchContext<V, M>) -> Option<VariableId>;
}

/// Picks uniformly at random among every variable in the model (assigned or
/// not), excluding committed variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomVariableSelection;

impl<V: Variable, M: Model<V>> VariableSelection<V, M> for RandomVariableSelection {
    fn select_variable(&mut self, context: &mut SearchContext<V, M>) -> Option<VariableId> {
        let candidates: Vec<VariableId> = context
            .solution()
            .model()
            .variables()
            .iter()
            .filter(|v| !v.is_committed())
            .map(|v| v.id())
            .collect();
        let rng = context.rng();
        candidates.choose(rng).copied()
    }
}

/// Prefers an unassigned variable, uniformly at random among those; falls
/// back to [`RandomVariableSelection`]'s full-domain pick once the
/// assignment is complete (spec §4.2's "prefer incomplete" rule).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnassignedFirstVariableSelection;

impl<V: Variable, M: Model<V>> VariableSelection<V, M> for UnassignedFirstVariableSelection {
    fn select_variable(&mut self, context: &mut SearchContext<V, M>) -> Option<VariableId> {
        let unassigned: Vec<VariableId> = context
            .solution()
            .assignment()
            .unassigned_variables()
            .filter(|id| !context.solution().model().variable(*id).is_committed())
            .collect();
        if !unassigned.is_empty() {
            let rng = context.rng();
            return unassigned.choose(rng).copied();
        }
        RandomVariableSelection.select_variable(context)
    }
}

/// Default variable-selection policy (spec §4.2 step 1): "random choice
/// among variables with maximum hardness, breaking ties randomly."
///
/// Hardness is the count of values in a variable's domain that would
/// conflict with something if assigned right now — the variable with the
/// fewest conflict-free options left is the hardest to place, so it is
/// reassigned first. Candidates are the unassigned, non-committed variables,
/// falling back to every non-committed variable once the assignment is
/// complete, mirroring [`UnassignedFirstVariableSelection`]'s fallback. Ties
/// (including the common all-zero case on an otherwise unconstrained model)
/// are broken randomly.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardestVariableSelection;

impl<V: Variable, M: Model<V>> VariableSelection<V, M> for HardestVariableSelection {
    fn select_variable(&mut self, context: &mut SearchContext<V, M>) -> Option<VariableId> {
        let candidates = candidate_variables(context);
        if candidates.is_empty() {
            return None;
        }

        let solution = context.solution();
        let model = solution.model();
        let assignment = solution.assignment();

        let mut hardest: Vec<VariableId> = Vec::new();
        let mut hardest_count = -1i64;
        for id in candidates {
            let variable = model.variable(id);
            let hardness = variable
                .values()
                .iter()
                .filter(|value| !model.conflict_values(assignment, value).is_empty())
                .count() as i64;
            match hardness.cmp(&hardest_count) {
                Ordering::Greater => {
                    hardest_count = hardness;
                    hardest.clear();
                    hardest.push(id);
                }
                Ordering::Equal => hardest.push(id),
                Ordering::Less => {}
            }
        }

        let rng = context.rng();
        hardest.choose(rng).copied()
    }
}

/// Unassigned, non-committed variables if any exist, otherwise every
/// non-committed variable.
fn candidate_variables<V: Variable, M: Model<V>>(
    context: &mut SearchContext<V, M>,
) -> Vec<VariableId> {
    let unassigned: Vec<VariableId> = context
        .solution()
        .assignment()
        .unassigned_variables()
        .filter(|id| !context.solution().model().variable(*id).is_committed())
        .collect();
    if !unassigned.is_empty() {
        return unassigned;
    }
    context
        .solution()
        .model()
        .variables()
        .iter()
        .filter(|v| !v.is_committed())
        .map(|v| v.id())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifs_core::test_support::triangle;
    use ifs_core::Solution;

    #[test]
    fn picks_the_variable_with_the_most_conflicting_values() {
        // A 2-domain triangle: once two variables are coloured differently,
        // the third has no conflict-free value left under either colour, so
        // it is the unique hardest variable.
        let model = triangle(2);
        let mut assignment = model.new_assignment();
        assignment.assign(0, model.variables()[0].values()[0].clone());
        assignment.assign(0, model.variables()[1].values()[1].clone());
        let mut context = SearchContext::new(Solution::new(model, assignment));

        let picked = HardestVariableSelection.select_variable(&mut context);
        assert_eq!(picked, Some(VariableId::new(2)));
    }

    #[test]
    fn breaks_ties_without_panicking_on_a_uniform_landscape() {
        let model = triangle(3);
        let assignment = model.new_assignment();
        let mut context = SearchContext::new(Solution::new(model, assignment));
        // No variable has any conflicting value yet, so every candidate
        // ties at hardness 0; the policy must still return one of them.
        let picked = HardestVariableSelection.select_variable(&mut context);
        assert!(picked.is_some());
    }
}
