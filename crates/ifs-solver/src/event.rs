//! Event hooks for monitoring solver progress, independent of the
//! lower-level value/best-saved notifications on [`ifs_core::SolutionListener`].

use std::fmt::Debug;

/// Notified as the composite search (spec §4.6) switches between its
/// constituent phases.
///
/// Distinct from `SolutionListener` (which reports value- and
/// best-solution-level changes): this reports the coarser phase lifecycle,
/// useful for logging and for tests that assert a particular phase ran.
pub trait PhaseLifecycleListener: Send + Sync + Debug {
    /// Called when phase `phase_index` (0-based, matching the configured
    /// phase list) starts.
    fn phase_started(&self, phase_index: usize, phase_name: &str) {
        let _ = (phase_index, phase_name);
    }

    /// Called when phase `phase_index` ends, reporting whether it was cut
    /// short by the overall search's termination rather than its own.
    fn phase_ended(&self, phase_index: usize, phase_name: &str, terminated_early: bool) {
        let _ = (phase_index, phase_name, terminated_early);
    }
}

/// A [`PhaseLifecycleListener`] that logs transitions via `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPhaseListener;

impl PhaseLifecycleListener for TracingPhaseListener {
    fn phase_started(&self, phase_index: usize, phase_name: &str) {
        tracing::info!(phase_index, phase_name, "phase started");
    }

    fn phase_ended(&self, phase_index: usize, phase_name: &str, terminated_early: bool) {
        tracing::info!(phase_index, phase_name, terminated_early, "phase ended");
    }
}
