//! Observer port - hooks for generation and solver events
//!
//! Observers are the only diagnostics channel of the library: progress bars,
//! traces and counters are adapters implementing this trait.

use crate::{
    Result,
    identifiers::StateId,
    world::{FailureReason, GraphStats, State},
};

/// Observer trait for monitoring state-space generation and value iteration
///
/// # Event Sequence
///
/// Generation:
/// 1. `on_generation_start(initial)` - once, before the first expansion
/// 2. For each popped state, exactly one of `on_accepting`, `on_failing` or
///    `on_state_expanded`
/// 3. `on_generation_end(stats)` - once, after the work list drains
///
/// Solving:
/// 1. `on_sweep(sweep, delta)` - after every Bellman sweep
/// 2. `on_solve_end(sweeps, final_delta)` - once, after convergence
///
/// # Examples
///
/// ```
/// use campfire::{ports::Observer, world::GraphStats};
///
/// struct Counter {
///     finished: usize,
/// }
///
/// impl Observer for Counter {
///     fn on_generation_end(&mut self, _stats: &GraphStats) -> campfire::Result<()> {
///         self.finished += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called once before the initial state is expanded.
    fn on_generation_start(&mut self, _initial: &State) -> Result<()> {
        Ok(())
    }

    /// Called after a non-terminal state received its outgoing edges.
    fn on_state_expanded(&mut self, _id: StateId, _state: &State, _edges: usize) -> Result<()> {
        Ok(())
    }

    /// Called when a state is classified accepting.
    fn on_accepting(&mut self, _id: StateId, _state: &State) -> Result<()> {
        Ok(())
    }

    /// Called when a state is classified failing.
    fn on_failing(&mut self, _id: StateId, _state: &State, _reason: FailureReason) -> Result<()> {
        Ok(())
    }

    /// Called once the whole reachable space has been explored.
    fn on_generation_end(&mut self, _stats: &GraphStats) -> Result<()> {
        Ok(())
    }

    /// Called after each synchronous sweep with the largest value change.
    fn on_sweep(&mut self, _sweep: usize, _delta: f64) -> Result<()> {
        Ok(())
    }

    /// Called when value iteration has converged.
    fn on_solve_end(&mut self, _sweeps: usize, _final_delta: f64) -> Result<()> {
        Ok(())
    }
}
