//! AND/OR composition of terminations.

use ifs_core::{Model, Variable};

use super::Termination;
use crate::scope::SearchContext;

/// Terminates when ANY child termination triggers. The common case — e.g.
/// "stop after 30 seconds OR after 250 iterations without improvement".
#[derive(Debug)]
pub struct OrTermination<V: Variable, M: Model<V>> {
    children: Vec<Box<dyn Termination<V, M>>>,
}

impl<V: Variable, M: Model<V>> OrTermination<V, M> {
    pub fn new(children: Vec<Box<dyn Termination<V, M>>>) -> Self {
        Self { children }
    }
}

impl<V: Variable, M: Model<V>> Termination<V, M> for OrTermination<V, M> {
    fn is_terminated(&self, context: &SearchContext<V, M>) -> bool {
        self.children.iter().any(|t| t.is_terminated(context))
    }
}

/// Terminates only when ALL child terminations agree. An empty `AndTermination`
/// never terminates.
#[derive(Debug)]
pub struct AndTermination<V: Variable, M: Model<V>> {
    children: Vec<Box<dyn Termination<V, M>>>,
}

impl<V: Variable, M: Model<V>> AndTermination<V, M> {
    pub fn new(children: Vec<Box<dyn Termination<V, M>>>) -> Self {
        Self { children }
    }
}

impl<V: Variable, M: Model<V>> Termination<V, M> for AndTermination<V, M> {
    fn is_terminated(&self, context: &SearchContext<V, M>) -> bool {
        !self.children.is_empty() && self.children.iter().all(|t| t.is_terminated(context))
    }
}
