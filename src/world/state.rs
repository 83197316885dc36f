//! World state representation

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::types::{Coord, Delivery, Item};

/// Quota of deliveries the agent has to reach before igniting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryTargets {
    pub logs: usize,
    pub stones: usize,
    pub fuel: usize,
}

impl Default for DeliveryTargets {
    fn default() -> Self {
        Self {
            logs: 2,
            stones: 3,
            fuel: 1,
        }
    }
}

/// Count of each delivery kind at the delivery zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryCounts {
    pub logs: usize,
    pub stones: usize,
    pub fuel: usize,
}

impl DeliveryCounts {
    /// At least the target amount of every kind has been delivered.
    pub fn meets(&self, targets: &DeliveryTargets) -> bool {
        self.logs >= targets.logs && self.stones >= targets.stones && self.fuel >= targets.fuel
    }

    /// No kind has been delivered beyond its target.
    pub fn within(&self, targets: &DeliveryTargets) -> bool {
        self.logs <= targets.logs && self.stones <= targets.stones && self.fuel <= targets.fuel
    }
}

/// One full configuration of the simulated world.
///
/// Equality and hashing cover every field except `actions_performed`. Floats
/// compare by bit pattern so that hashing stays consistent with equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub satiety: f64,
    pub remaining_time: f64,
    pub game_progress: u32,
    pub cargo: Option<Item>,
    pub position: Coord,
    pub log_cells: Vec<u32>,
    pub stone_cells: Vec<u32>,
    pub delivered: Vec<Delivery>,
    pub ignited: bool,
    pub actions_performed: u32,
}

impl State {
    /// Fresh state at `position` with empty hands and nothing delivered.
    pub fn new(position: Coord, satiety: f64, remaining_time: f64) -> Self {
        Self {
            satiety,
            remaining_time,
            game_progress: 0,
            cargo: None,
            position,
            log_cells: Vec::new(),
            stone_cells: Vec::new(),
            delivered: Vec::new(),
            ignited: false,
            actions_performed: 0,
        }
    }

    pub fn with_log_cells(mut self, quantities: Vec<u32>) -> Self {
        self.log_cells = quantities;
        self
    }

    pub fn with_stone_cells(mut self, quantities: Vec<u32>) -> Self {
        self.stone_cells = quantities;
        self
    }

    pub fn delivered_counts(&self) -> DeliveryCounts {
        let mut counts = DeliveryCounts::default();
        for delivery in &self.delivered {
            match delivery {
                Delivery::Log => counts.logs += 1,
                Delivery::Stone => counts.stones += 1,
                Delivery::Fuel => counts.fuel += 1,
            }
        }
        counts
    }

    /// Enough of every kind has been delivered to ignite.
    pub fn is_right_amount(&self, targets: &DeliveryTargets) -> bool {
        self.delivered_counts().meets(targets)
    }

    /// Delivered counts still within the targets; gates progress rewards.
    pub fn is_progress_positive(&self, targets: &DeliveryTargets) -> bool {
        self.delivered_counts().within(targets)
    }

    pub fn is_carrying(&self) -> bool {
        self.cargo.is_some()
    }

    /// Copy of this state with the action counter advanced.
    pub(crate) fn successor(&self) -> Self {
        let mut next = self.clone();
        next.actions_performed += 1;
        next
    }

    /// Short single-line summary used in traces and graph labels.
    pub fn summary(&self) -> String {
        let cargo = self.cargo.map(Item::as_str).unwrap_or("-");
        let delivered: String = self
            .delivered
            .iter()
            .map(|d| match d {
                Delivery::Log => 'L',
                Delivery::Stone => 'S',
                Delivery::Fuel => 'F',
            })
            .collect();
        format!(
            "sat={:.1} t={} p={} at {} carry={} logs={:?} stones={:?} zone=[{}]{}",
            self.satiety,
            self.remaining_time,
            self.game_progress,
            self.position,
            cargo,
            self.log_cells,
            self.stone_cells,
            delivered,
            if self.ignited { " lit" } else { "" }
        )
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.satiety.to_bits() == other.satiety.to_bits()
            && self.remaining_time.to_bits() == other.remaining_time.to_bits()
            && self.game_progress == other.game_progress
            && self.cargo == other.cargo
            && self.position == other.position
            && self.log_cells == other.log_cells
            && self.stone_cells == other.stone_cells
            && self.delivered == other.delivered
            && self.ignited == other.ignited
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.satiety.to_bits().hash(state);
        self.remaining_time.to_bits().hash(state);
        self.game_progress.hash(state);
        self.cargo.hash(state);
        self.position.hash(state);
        self.log_cells.hash(state);
        self.stone_cells.hash(state);
        self.delivered.hash(state);
        self.ignited.hash(state);
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
