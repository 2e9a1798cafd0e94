//! Search-level scope: the mutable context threaded through a solve.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ifs_core::{Model, Solution, Variable};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Everything a [`crate::heuristic::NeighbourSelection`] or
/// [`crate::termination::Termination`] needs to see about the state of an
/// in-progress search, besides the model and assignment themselves (which
/// live on [`Solution`] and are reached through [`SearchContext::solution`]).
///
/// One `SearchContext` is created per [`crate::solver::Solver::solve`] call
/// and lives for its duration; a parallel restart (spec §5) creates one
/// `SearchContext` per worker, each with its own RNG seeded independently.
pub struct SearchContext<V: Variable, M: Model<V>> {
    solution: Solution<V, M>,
    rng: ChaCha8Rng,
    start_time: Option<Instant>,
    iteration: u64,
    terminate_flag: Option<Arc<AtomicBool>>,
}

impl<V: Variable, M: Model<V>> SearchContext<V, M> {
    /// Creates a context with an OS-seeded RNG.
    pub fn new(solution: Solution<V, M>) -> Self {
        Self {
            solution,
            rng: ChaCha8Rng::from_os_rng(),
            start_time: None,
            iteration: 0,
            terminate_flag: None,
        }
    }

    /// Creates a context with a fixed RNG seed, for reproducible runs.
    pub fn with_seed(solution: Solution<V, M>, seed: u64) -> Self {
        Self {
            solution,
            rng: ChaCha8Rng::seed_from_u64(seed),
            start_time: None,
            iteration: 0,
            terminate_flag: None,
        }
    }

    /// Installs an externally-controlled termination flag; setting it to
    /// `true` from another thread requests the search stop at its next
    /// iteration boundary.
    pub fn with_terminate_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.terminate_flag = Some(flag);
        self
    }

    /// Marks the search as started, resetting elapsed-time tracking.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Time elapsed since [`start`](Self::start), if it has been called.
    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|t| t.elapsed())
    }

    /// The solution (model + assignment + best-known state) being searched.
    pub fn solution(&self) -> &Solution<V, M> {
        &self.solution
    }

    /// Mutable access to the solution.
    pub fn solution_mut(&mut self) -> &mut Solution<V, M> {
        &mut self.solution
    }

    /// The RNG this context's selections should draw from. Never share one
    /// RNG across contexts that may run concurrently (spec §5) — each
    /// `SearchContext` owns its own stream.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// The current iteration counter (mirrors the working assignment's, but
    /// is tracked here too so termination conditions can read it without
    /// borrowing the assignment).
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Advances the iteration counter by one and returns the new value.
    pub fn next_iteration(&mut self) -> u64 {
        self.iteration += 1;
        self.iteration
    }

    /// True if an external caller has requested early termination.
    pub fn is_terminate_requested(&self) -> bool {
        self.terminate_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Consumes the context, returning the final solution.
    pub fn into_solution(self) -> Solution<V, M> {
        self.solution
    }
}
