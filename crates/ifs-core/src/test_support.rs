//! A tiny fixture model, reused across this workspace's integration tests.
//!
//! `ToyModel` is a graph-colouring-style CSP: each [`ToyVariable`] has a
//! small domain of colours, and a `Distinct` constraint forbids two related
//! variables from sharing a colour. It is deliberately small and has no
//! soft constraints by default — individual tests layer in a custom
//! [`crate::model::Model::get_total_value`] via [`ToyModel::with_penalty`]
//! where a scenario needs one.

use std::collections::HashMap;
use std::fmt;

use crate::domain::{Assignment, Constraint, GlobalConstraint, Variable, VariableId};
use crate::model::Model;

/// A toy colour value: an integer tagged with its owning variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToyValue {
    pub variable: VariableId,
    pub colour: u32,
}

impl crate::domain::Value for ToyValue {
    type Variable = ToyVariable;

    fn variable_id(&self) -> VariableId {
        self.variable
    }
}

/// A toy variable: an id, an ordering index, and a domain of colours.
#[derive(Debug, Clone)]
pub struct ToyVariable {
    pub id: VariableId,
    pub ordering_index: usize,
    pub domain: Vec<ToyValue>,
}

impl ToyVariable {
    pub fn new(id: u32, ordering_index: usize, domain_size: u32) -> Self {
        let vid = VariableId::new(id);
        let domain = (0..domain_size)
            .map(|colour| ToyValue {
                variable: vid,
                colour,
            })
            .collect();
        Self {
            id: vid,
            ordering_index,
            domain,
        }
    }
}

impl Variable for ToyVariable {
    type Value = ToyValue;

    fn id(&self) -> VariableId {
        self.id
    }

    fn ordering_index(&self) -> usize {
        self.ordering_index
    }

    fn values(&self) -> &[ToyValue] {
        &self.domain
    }
}

/// Forbids the two named variables from sharing a colour.
#[derive(Debug, Clone)]
pub struct DistinctConstraint {
    pub variables: [VariableId; 2],
}

impl DistinctConstraint {
    pub fn new(a: VariableId, b: VariableId) -> Self {
        Self { variables: [a, b] }
    }

    fn other(&self, id: VariableId) -> Option<VariableId> {
        if self.variables[0] == id {
            Some(self.variables[1])
        } else if self.variables[1] == id {
            Some(self.variables[0])
        } else {
            None
        }
    }
}

impl Constraint<ToyVariable> for DistinctConstraint {
    fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    fn conflict_values(
        &self,
        assignment: &Assignment<ToyVariable>,
        value: &ToyValue,
    ) -> Vec<ToyValue> {
        let Some(other) = self.other(value.variable) else {
            return Vec::new();
        };
        match assignment.get_value(other) {
            Some(other_value) if other_value.colour == value.colour => vec![other_value.clone()],
            _ => Vec::new(),
        }
    }
}

/// A `DistinctConstraint` promoted to a global constraint, for tests that
/// need to exercise the global-constraint path specifically.
#[derive(Debug, Clone)]
pub struct GlobalDistinctConstraint(pub DistinctConstraint);

impl Constraint<ToyVariable> for GlobalDistinctConstraint {
    fn variables(&self) -> &[VariableId] {
        self.0.variables()
    }

    fn conflict_values(
        &self,
        assignment: &Assignment<ToyVariable>,
        value: &ToyValue,
    ) -> Vec<ToyValue> {
        self.0.conflict_values(assignment, value)
    }
}

impl GlobalConstraint<ToyVariable> for GlobalDistinctConstraint {}

/// A small graph-colouring model: `n` variables, each pairwise-adjacent pair
/// named in `edges` constrained to differ.
pub struct ToyModel {
    variables: Vec<ToyVariable>,
    constraints: Vec<Box<dyn Constraint<ToyVariable>>>,
    global_constraints: Vec<Box<dyn GlobalConstraint<ToyVariable>>>,
    penalty: Option<Box<dyn Fn(&Assignment<ToyVariable>) -> f64 + Send + Sync>>,
}

impl fmt::Debug for ToyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToyModel")
            .field("variables", &self.variables.len())
            .field("constraints", &self.constraints.len())
            .field("global_constraints", &self.global_constraints.len())
            .finish()
    }
}

impl ToyModel {
    /// Builds a model with `n` variables of domain size `domain_size`, and a
    /// `Distinct` constraint for each `(a, b)` pair in `edges`.
    pub fn new(n: u32, domain_size: u32, edges: &[(u32, u32)]) -> Self {
        let variables = (0..n)
            .map(|i| ToyVariable::new(i, i as usize, domain_size))
            .collect();
        let constraints = edges
            .iter()
            .map(|&(a, b)| {
                Box::new(DistinctConstraint::new(VariableId::new(a), VariableId::new(b)))
                    as Box<dyn Constraint<ToyVariable>>
            })
            .collect();
        Self {
            variables,
            constraints,
            global_constraints: Vec::new(),
            penalty: None,
        }
    }

    /// Replaces one `(a, b)` edge constraint with its global-constraint
    /// equivalent, for tests exercising the global-constraint path.
    pub fn with_global_edge(mut self, a: u32, b: u32) -> Self {
        let a = VariableId::new(a);
        let b = VariableId::new(b);
        self.constraints.retain(|c| {
            let vars = c.variables();
            !(vars.len() == 2 && ((vars[0] == a && vars[1] == b) || (vars[0] == b && vars[1] == a)))
        });
        self.global_constraints
            .push(Box::new(GlobalDistinctConstraint(DistinctConstraint::new(a, b))));
        self
    }

    /// Attaches a soft-penalty function used by `get_total_value`.
    pub fn with_penalty(
        mut self,
        penalty: impl Fn(&Assignment<ToyVariable>) -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.penalty = Some(Box::new(penalty));
        self
    }

    /// A fresh, empty assignment over this model's variables.
    pub fn new_assignment(&self) -> Assignment<ToyVariable> {
        Assignment::new(self.variables.iter().map(|v| v.id).collect())
    }
}

impl Model<ToyVariable> for ToyModel {
    fn variables(&self) -> &[ToyVariable] {
        &self.variables
    }

    fn constraints(&self) -> &[Box<dyn Constraint<ToyVariable>>] {
        &self.constraints
    }

    fn global_constraints(&self) -> &[Box<dyn GlobalConstraint<ToyVariable>>] {
        &self.global_constraints
    }

    fn get_total_value(&self, assignment: &Assignment<ToyVariable>) -> f64 {
        match &self.penalty {
            Some(penalty) => penalty(assignment),
            None => 0.0,
        }
    }
}

/// Builds the classic triangle (3-cycle) graph-colouring instance: three
/// mutually adjacent variables, each with `domain_size` colours. With
/// `domain_size < 3` no complete conflict-free assignment exists.
pub fn triangle(domain_size: u32) -> ToyModel {
    ToyModel::new(3, domain_size, &[(0, 1), (1, 2), (0, 2)])
}

/// Builds a ring of `n` variables (each adjacent to its neighbour, wrapping
/// around), with `domain_size` colours each.
pub fn ring(n: u32, domain_size: u32) -> ToyModel {
    let edges: Vec<(u32, u32)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
    ToyModel::new(n, domain_size, &edges)
}

/// A full assignment snapshot for a model, used to compare against an
/// `Assignment`'s contents in tests without depending on iteration order.
pub fn assignment_colours(assignment: &Assignment<ToyVariable>) -> HashMap<u32, u32> {
    assignment
        .assigned_variables()
        .map(|id| (id.index() as u32, assignment.get_value(id).unwrap().colour))
        .collect()
}
