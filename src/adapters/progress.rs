//! Progress spinner observer

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Error, Result,
    identifiers::StateId,
    ports::Observer,
    world::{FailureReason, GraphStats, State},
};

/// How many expansions pass between spinner refreshes.
const REFRESH_INTERVAL: usize = 4096;

/// Spinner showing exploration and solver progress
pub struct ProgressObserver {
    spinner: Option<ProgressBar>,
    expanded: usize,
    accepting: usize,
    failing: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            spinner: None,
            expanded: 0,
            accepting: 0,
            failing: 0,
        }
    }

    fn start(&mut self, message: String) -> Result<()> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?,
        );
        spinner.set_message(message);
        self.spinner = Some(spinner);
        Ok(())
    }

    fn message(&self) -> String {
        format!(
            "{} expanded, {} accepting, {} failing",
            self.expanded, self.accepting, self.failing
        )
    }

    fn refresh(&self) {
        let seen = self.expanded + self.accepting + self.failing;
        if let Some(spinner) = &self.spinner {
            if seen.is_multiple_of(REFRESH_INTERVAL) {
                spinner.set_message(self.message());
                spinner.tick();
            }
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_generation_start(&mut self, _initial: &State) -> Result<()> {
        self.start("exploring state space".to_string())
    }

    fn on_state_expanded(&mut self, _id: StateId, _state: &State, _edges: usize) -> Result<()> {
        self.expanded += 1;
        self.refresh();
        Ok(())
    }

    fn on_accepting(&mut self, _id: StateId, _state: &State) -> Result<()> {
        self.accepting += 1;
        self.refresh();
        Ok(())
    }

    fn on_failing(&mut self, _id: StateId, _state: &State, _reason: FailureReason) -> Result<()> {
        self.failing += 1;
        self.refresh();
        Ok(())
    }

    fn on_generation_end(&mut self, stats: &GraphStats) -> Result<()> {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!(
                "{} states, {} transitions",
                stats.total_states, stats.transitions
            ));
        }
        Ok(())
    }

    fn on_sweep(&mut self, sweep: usize, delta: f64) -> Result<()> {
        if self.spinner.is_none() {
            self.start("value iteration".to_string())?;
        }
        if let Some(spinner) = &self.spinner {
            spinner.set_message(format!("sweep {sweep}, delta {delta:.6}"));
            spinner.tick();
        }
        Ok(())
    }

    fn on_solve_end(&mut self, sweeps: usize, final_delta: f64) -> Result<()> {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!(
                "converged after {sweeps} sweeps (delta {final_delta:.6})"
            ));
        }
        Ok(())
    }
}
