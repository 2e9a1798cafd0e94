//! Progress reporting for long-running searches.

/// A sink for coarse-grained progress updates during a search.
///
/// Distinct from `tracing` spans/events (which log detail for diagnostics):
/// a `Progress` implementor is meant for driving a UI or CLI progress bar,
/// so it only receives the handful of numbers a caller would want to render.
pub trait Progress: Send + Sync {
    /// Called periodically with the fraction of the search budget consumed
    /// so far, in `[0.0, 1.0]`. Termination conditions that have no natural
    /// notion of "fraction done" (e.g. an externally-signalled termination)
    /// may never call this.
    fn set_fraction(&self, fraction: f64);

    /// Called whenever a new best solution is found, with its total value
    /// and the iteration at which it was found.
    fn best_found(&self, value: f64, iteration: u64);
}

/// A [`Progress`] implementation that simply logs updates via `tracing`.
///
/// This is the default used when no progress sink is configured; it costs
/// nothing when no subscriber is installed, since `tracing` events are
/// no-ops without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn set_fraction(&self, fraction: f64) {
        tracing::debug!(fraction, "search progress");
    }

    fn best_found(&self, value: f64, iteration: u64) {
        tracing::info!(value, iteration, "new best solution");
    }
}
