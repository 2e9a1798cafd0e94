//! Termination driven by an externally-set flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ifs_core::{Model, Variable};

use super::Termination;
use crate::scope::SearchContext;

/// Terminates when a shared flag is set, letting a caller on another thread
/// (or a signal handler) request a clean stop.
///
/// This duplicates [`SearchContext::is_terminate_requested`] as an explicit
/// `Termination`, for callers that compose terminations via
/// [`super::OrTermination`] rather than checking the context directly.
#[derive(Debug, Clone)]
pub struct ExternalTermination {
    flag: Arc<AtomicBool>,
}

impl ExternalTermination {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }
}

impl<V: Variable, M: Model<V>> Termination<V, M> for ExternalTermination {
    fn is_terminated(&self, _context: &SearchContext<V, M>) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
