//! Event-counting observer

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    identifiers::StateId,
    ports::Observer,
    world::{FailureReason, GraphStats, State},
};

/// Counts of the events seen by a [`StatsObserver`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventCounts {
    pub generations: usize,
    pub expanded: usize,
    pub accepting: usize,
    pub out_of_time: usize,
    pub starved: usize,
    pub stuck: usize,
    /// Largest out-degree of an expanded state
    pub max_out_degree: usize,
    pub sweeps: usize,
    pub last_delta: Option<f64>,
    pub final_stats: Option<GraphStats>,
}

impl EventCounts {
    pub fn failing(&self) -> usize {
        self.out_of_time + self.starved + self.stuck
    }
}

/// Observer that tallies events into a shared [`EventCounts`].
///
/// The generator and solver take ownership of their observers, so the counts
/// are read back through a handle obtained before handing the observer over.
///
/// ```
/// use campfire::adapters::StatsObserver;
///
/// let observer = StatsObserver::new();
/// let handle = observer.handle();
/// // generator.with_observer(Box::new(observer)) ...
/// assert_eq!(handle.lock().unwrap().expanded, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatsObserver {
    counts: Arc<Mutex<EventCounts>>,
}

impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Arc<Mutex<EventCounts>> {
        Arc::clone(&self.counts)
    }

    /// Copy of the counts so far.
    pub fn snapshot(&self) -> EventCounts {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, f: impl FnOnce(&mut EventCounts)) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut counts);
    }
}

impl Observer for StatsObserver {
    fn on_generation_start(&mut self, _initial: &State) -> Result<()> {
        self.update(|c| c.generations += 1);
        Ok(())
    }

    fn on_state_expanded(&mut self, _id: StateId, _state: &State, edges: usize) -> Result<()> {
        self.update(|c| {
            c.expanded += 1;
            c.max_out_degree = c.max_out_degree.max(edges);
        });
        Ok(())
    }

    fn on_accepting(&mut self, _id: StateId, _state: &State) -> Result<()> {
        self.update(|c| c.accepting += 1);
        Ok(())
    }

    fn on_failing(&mut self, _id: StateId, _state: &State, reason: FailureReason) -> Result<()> {
        self.update(|c| match reason {
            FailureReason::OutOfTime => c.out_of_time += 1,
            FailureReason::Starved => c.starved += 1,
            FailureReason::NoAffordableAction => c.stuck += 1,
        });
        Ok(())
    }

    fn on_generation_end(&mut self, stats: &GraphStats) -> Result<()> {
        let stats = *stats;
        self.update(|c| c.final_stats = Some(stats));
        Ok(())
    }

    fn on_sweep(&mut self, _sweep: usize, delta: f64) -> Result<()> {
        self.update(|c| {
            c.sweeps += 1;
            c.last_delta = Some(delta);
        });
        Ok(())
    }
}
