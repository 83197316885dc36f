//! Rule catalog: board geometry, resource cells and weighting constants.
//!
//! A catalog fully parameterizes the transition rules. It can be assembled with
//! the builder-style setters or loaded from JSON:
//!
//! ```
//! use campfire::world::RuleCatalog;
//!
//! let catalog = RuleCatalog::new(3, 3, (2, 1))
//!     .with_delivery_zone((2, 2))
//!     .with_filling_station((0, 0))
//!     .with_max_satiety(11.0)
//!     .with_max_time(50.0)
//!     .add_log_cell((2, 0), 4)
//!     .add_stone_cell((0, 2), 6);
//! assert!(catalog.validate().is_ok());
//! ```

use std::{collections::BTreeSet, fs, path::Path};

use serde::{Deserialize, Serialize};

use super::state::{DeliveryCounts, DeliveryTargets, State};
use crate::{
    Error, Result,
    types::{Coord, Item},
};

/// Satiety and time costs of the individual actions.
pub mod costs {
    /// Satiety spent by picking up, unloading or igniting.
    pub const HANDLING: f64 = 0.1;
    /// Minimum satiety required to pick up, unload or ignite.
    pub const HANDLING_MIN_SATIETY: f64 = 0.1;
    /// Satiety spent by the final fuel delivery.
    pub const FINAL_DELIVERY: f64 = 1.0;
    /// Minimum satiety required for the final fuel delivery.
    pub const FINAL_DELIVERY_MIN_SATIETY: f64 = 2.1;
    /// Time spent by every non-fast action.
    pub const STEP_TIME: f64 = 1.0;
    /// Time spent by a fast-pace move.
    pub const FAST_STEP_TIME: f64 = 0.5;
    /// Satiety spent by a normal-pace move with empty hands.
    pub const MOVE: f64 = 1.0;
    /// Satiety spent by a fast-pace move with empty hands.
    pub const FAST_MOVE: f64 = 2.0;
    /// Extra satiety for a normal-pace move while carrying.
    pub const LOADED_MOVE_SURCHARGE: f64 = 0.5;
    /// Extra satiety for a fast-pace move while carrying.
    pub const LOADED_FAST_MOVE_SURCHARGE: f64 = 1.0;
}

/// Predicate gating the final (fuel) delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinalDeliveryGate {
    /// At least one log is already in the delivery zone.
    #[default]
    AtLeastOneLog,
    /// The log and stone targets have been delivered exactly.
    Quota,
}

impl FinalDeliveryGate {
    pub fn allows(self, counts: &DeliveryCounts, targets: &DeliveryTargets) -> bool {
        match self {
            FinalDeliveryGate::AtLeastOneLog => counts.logs >= 1,
            FinalDeliveryGate::Quota => {
                counts.logs == targets.logs && counts.stones == targets.stones
            }
        }
    }
}

/// A cell the agent can pick resources from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCell {
    pub position: Coord,
    pub quantity: u32,
}

/// Static configuration parameterizing the legal transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCatalog {
    pub board_width: usize,
    pub board_height: usize,
    /// Starting cell of the agent
    pub start: Coord,
    pub delivery_zone: Coord,
    pub filling_station: Coord,
    #[serde(default = "defaults::max_satiety")]
    pub max_satiety: f64,
    #[serde(default = "defaults::max_time")]
    pub max_time: f64,
    #[serde(default = "defaults::hunger_weight")]
    pub hunger_weight: f64,
    #[serde(default = "defaults::time_weight")]
    pub time_weight: f64,
    #[serde(default = "defaults::progress_weight")]
    pub progress_weight: f64,
    /// Blend between the station preference and the delivery preference
    #[serde(default = "defaults::eat_vs_unload")]
    pub eat_vs_unload_preference: f64,
    /// Probability mass reserved for preferred directions
    #[serde(default = "defaults::eat_and_unload_vs_rest")]
    pub eat_and_unload_vs_rest_preference: f64,
    /// Satiety regained by one refuel action, capped at `max_satiety`
    #[serde(default = "defaults::refuel_amount")]
    pub refuel_amount: f64,
    #[serde(default)]
    pub log_cells: Vec<ResourceCell>,
    #[serde(default)]
    pub stone_cells: Vec<ResourceCell>,
    #[serde(default)]
    pub targets: DeliveryTargets,
    /// Enables fast-pace movement
    #[serde(default)]
    pub fast_pace: bool,
    #[serde(default)]
    pub final_delivery_gate: FinalDeliveryGate,
    /// Upper bound on generated states, `None` for unbounded
    #[serde(default)]
    pub max_states: Option<usize>,
}

mod defaults {
    pub fn max_satiety() -> f64 {
        20.0
    }
    pub fn max_time() -> f64 {
        60.0
    }
    pub fn hunger_weight() -> f64 {
        0.2
    }
    pub fn time_weight() -> f64 {
        0.1
    }
    pub fn progress_weight() -> f64 {
        5.0
    }
    pub fn eat_vs_unload() -> f64 {
        0.8
    }
    pub fn eat_and_unload_vs_rest() -> f64 {
        0.7
    }
    pub fn refuel_amount() -> f64 {
        5.0
    }
}

impl RuleCatalog {
    /// Create a catalog for a `width` x `height` board with the agent at `start`.
    ///
    /// Delivery zone and filling station default to `(0, 0)`; weights and
    /// preferences default to the stock tuning.
    pub fn new(width: usize, height: usize, start: impl Into<Coord>) -> Self {
        Self {
            board_width: width,
            board_height: height,
            start: start.into(),
            delivery_zone: Coord::new(0, 0),
            filling_station: Coord::new(0, 0),
            max_satiety: defaults::max_satiety(),
            max_time: defaults::max_time(),
            hunger_weight: defaults::hunger_weight(),
            time_weight: defaults::time_weight(),
            progress_weight: defaults::progress_weight(),
            eat_vs_unload_preference: defaults::eat_vs_unload(),
            eat_and_unload_vs_rest_preference: defaults::eat_and_unload_vs_rest(),
            refuel_amount: defaults::refuel_amount(),
            log_cells: Vec::new(),
            stone_cells: Vec::new(),
            targets: DeliveryTargets::default(),
            fast_pace: false,
            final_delivery_gate: FinalDeliveryGate::default(),
            max_states: None,
        }
    }

    pub fn with_delivery_zone(mut self, coord: impl Into<Coord>) -> Self {
        self.delivery_zone = coord.into();
        self
    }

    pub fn with_filling_station(mut self, coord: impl Into<Coord>) -> Self {
        self.filling_station = coord.into();
        self
    }

    pub fn with_max_satiety(mut self, max_satiety: f64) -> Self {
        self.max_satiety = max_satiety;
        self
    }

    pub fn with_max_time(mut self, max_time: f64) -> Self {
        self.max_time = max_time;
        self
    }

    /// Set the hunger, time and progress reward weights.
    pub fn with_weights(mut self, hunger: f64, time: f64, progress: f64) -> Self {
        self.hunger_weight = hunger;
        self.time_weight = time;
        self.progress_weight = progress;
        self
    }

    pub fn with_preferences(mut self, eat_vs_unload: f64, eat_and_unload_vs_rest: f64) -> Self {
        self.eat_vs_unload_preference = eat_vs_unload;
        self.eat_and_unload_vs_rest_preference = eat_and_unload_vs_rest;
        self
    }

    pub fn with_refuel_amount(mut self, amount: f64) -> Self {
        self.refuel_amount = amount;
        self
    }

    pub fn with_targets(mut self, targets: DeliveryTargets) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_fast_pace(mut self, enabled: bool) -> Self {
        self.fast_pace = enabled;
        self
    }

    pub fn with_final_delivery_gate(mut self, gate: FinalDeliveryGate) -> Self {
        self.final_delivery_gate = gate;
        self
    }

    pub fn with_max_states(mut self, limit: usize) -> Self {
        self.max_states = Some(limit);
        self
    }

    pub fn add_log_cell(mut self, position: impl Into<Coord>, quantity: u32) -> Self {
        self.log_cells.push(ResourceCell {
            position: position.into(),
            quantity,
        });
        self
    }

    pub fn add_stone_cell(mut self, position: impl Into<Coord>, quantity: u32) -> Self {
        self.stone_cells.push(ResourceCell {
            position: position.into(),
            quantity,
        });
        self
    }

    /// Resource cells of the given kind.
    pub fn cells(&self, item: Item) -> &[ResourceCell] {
        match item {
            Item::Log => &self.log_cells,
            Item::Stone => &self.stone_cells,
        }
    }

    /// The state the agent starts from: full satiety, full time, full cells.
    pub fn initial_state(&self) -> State {
        State::new(self.start, self.max_satiety, self.max_time)
            .with_log_cells(self.log_cells.iter().map(|c| c.quantity).collect())
            .with_stone_cells(self.stone_cells.iter().map(|c| c.quantity).collect())
    }

    /// Reward of moving from `prev` to `next`.
    pub fn feedback(&self, prev: &State, next: &State) -> f64 {
        self.hunger_weight * (next.satiety - prev.satiety)
            + self.time_weight * (next.remaining_time - prev.remaining_time)
            + self.progress_weight * (f64::from(next.game_progress) - f64::from(prev.game_progress))
    }

    /// Check the catalog for inconsistent geometry or weights.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBoard`] for coordinates off the board and
    /// [`Error::InvalidConfiguration`] for degenerate sizes or weights.
    pub fn validate(&self) -> Result<()> {
        if self.board_width == 0 || self.board_height == 0 {
            return Err(Error::config(format!(
                "board must have positive dimensions, got {}x{}",
                self.board_width, self.board_height
            )));
        }

        self.check_on_board("start", self.start)?;
        self.check_on_board("delivery zone", self.delivery_zone)?;
        self.check_on_board("filling station", self.filling_station)?;
        for (i, cell) in self.log_cells.iter().enumerate() {
            self.check_on_board(&format!("log cell {i}"), cell.position)?;
        }
        for (i, cell) in self.stone_cells.iter().enumerate() {
            self.check_on_board(&format!("stone cell {i}"), cell.position)?;
        }

        for (name, value) in [
            ("max_satiety", self.max_satiety),
            ("max_time", self.max_time),
            ("refuel_amount", self.refuel_amount),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        for (name, value) in [
            ("hunger_weight", self.hunger_weight),
            ("time_weight", self.time_weight),
            ("progress_weight", self.progress_weight),
        ] {
            if !value.is_finite() {
                return Err(Error::config(format!("{name} must be finite, got {value}")));
            }
        }

        if !(0.0..=1.0).contains(&self.eat_vs_unload_preference) {
            return Err(Error::config(format!(
                "eat_vs_unload_preference must lie in [0, 1], got {}",
                self.eat_vs_unload_preference
            )));
        }
        // At 1 the reserved mass leaves nothing for the remaining actions.
        if !(0.0..1.0).contains(&self.eat_and_unload_vs_rest_preference) {
            return Err(Error::config(format!(
                "eat_and_unload_vs_rest_preference must lie in [0, 1), got {}",
                self.eat_and_unload_vs_rest_preference
            )));
        }

        let mut positions = BTreeSet::new();
        for (kind, cells) in [("log", &self.log_cells), ("stone", &self.stone_cells)] {
            positions.clear();
            for cell in cells {
                if !positions.insert(cell.position) {
                    return Err(Error::config(format!(
                        "two {kind} cells share position ({}, {})",
                        cell.position.x, cell.position.y
                    )));
                }
            }
        }

        if self.max_states == Some(0) {
            return Err(Error::config("max_states must be positive when set"));
        }

        Ok(())
    }

    /// Check that `state` can be explored under this catalog.
    pub fn validate_state(&self, state: &State) -> Result<()> {
        self.check_on_board("initial position", state.position)?;
        if state.log_cells.len() != self.log_cells.len() {
            return Err(Error::config(format!(
                "state tracks {} log cells but the catalog defines {}",
                state.log_cells.len(),
                self.log_cells.len()
            )));
        }
        if state.stone_cells.len() != self.stone_cells.len() {
            return Err(Error::config(format!(
                "state tracks {} stone cells but the catalog defines {}",
                state.stone_cells.len(),
                self.stone_cells.len()
            )));
        }
        if !state.satiety.is_finite() || state.satiety < 0.0 || state.satiety > self.max_satiety
        {
            return Err(Error::config(format!(
                "initial satiety {} outside [0, {}]",
                state.satiety, self.max_satiety
            )));
        }
        if !state.remaining_time.is_finite() {
            return Err(Error::config("initial remaining time must be finite"));
        }
        Ok(())
    }

    fn check_on_board(&self, what: &str, coord: Coord) -> Result<()> {
        if coord.within(self.board_width, self.board_height) {
            Ok(())
        } else {
            Err(Error::OutOfBoard {
                what: what.to_string(),
                x: coord.x,
                y: coord.y,
                width: self.board_width,
                height: self.board_height,
            })
        }
    }

    /// Parse a catalog from a JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: RuleCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read rule catalog {}", path.display()),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Serialize the catalog as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> RuleCatalog {
        RuleCatalog::new(3, 3, (2, 1))
            .with_delivery_zone((2, 2))
            .with_filling_station((0, 0))
            .with_max_satiety(11.0)
            .with_max_time(50.0)
            .add_log_cell((2, 0), 4)
            .add_stone_cell((0, 2), 6)
    }

    #[test]
    fn initial_state_mirrors_catalog() {
        let catalog = tiny();
        let state = catalog.initial_state();
        assert_eq!(state.position, Coord::new(2, 1));
        assert_eq!(state.satiety, 11.0);
        assert_eq!(state.remaining_time, 50.0);
        assert_eq!(state.log_cells, vec![4]);
        assert_eq!(state.stone_cells, vec![6]);
        assert!(state.delivered.is_empty());
        assert!(!state.ignited);
    }

    #[test]
    fn start_outside_board_is_rejected() {
        let catalog = RuleCatalog::new(3, 3, (3, 0));
        match catalog.validate() {
            Err(Error::OutOfBoard { what, x, y, .. }) => {
                assert_eq!(what, "start");
                assert_eq!((x, y), (3, 0));
            }
            other => panic!("expected out-of-board error, got {other:?}"),
        }
    }

    #[test]
    fn resource_cell_outside_board_is_rejected() {
        let catalog = tiny().add_stone_cell((5, 5), 1);
        assert!(matches!(
            catalog.validate(),
            Err(Error::OutOfBoard { .. })
        ));
    }

    #[test]
    fn preferences_must_be_probabilities() {
        let catalog = tiny().with_preferences(1.5, 0.7);
        assert!(matches!(
            catalog.validate(),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn full_reservation_is_rejected() {
        let catalog = tiny().with_preferences(0.8, 1.0);
        match catalog.validate() {
            Err(Error::InvalidConfiguration { message }) => {
                assert!(message.contains("eat_and_unload_vs_rest_preference"));
            }
            other => panic!("expected invalid preference, got {other:?}"),
        }
        assert!(tiny().with_preferences(0.8, 0.99).validate().is_ok());
        assert!(tiny().with_preferences(1.0, 0.0).validate().is_ok());
    }

    #[test]
    fn colocated_cells_of_one_kind_are_rejected() {
        let catalog = tiny().add_log_cell((2, 0), 1);
        match catalog.validate() {
            Err(Error::InvalidConfiguration { message }) => {
                assert!(message.contains("log cells share position (2, 0)"));
            }
            other => panic!("expected colocated cell error, got {other:?}"),
        }
        // A log and a stone may share a cell; their actions differ by item.
        assert!(tiny().add_stone_cell((2, 0), 1).validate().is_ok());
    }

    #[test]
    fn mismatched_state_is_rejected() {
        let catalog = tiny();
        let state = catalog.initial_state().with_log_cells(vec![1, 2]);
        assert!(catalog.validate_state(&state).is_err());
    }

    #[test]
    fn feedback_weights_each_delta() {
        let catalog = tiny();
        let prev = catalog.initial_state();
        let mut next = prev.clone();
        next.satiety -= 1.0;
        next.remaining_time -= 1.0;
        next.game_progress += 1;
        let expected = 0.2 * -1.0 + 0.1 * -1.0 + 5.0;
        assert!((catalog.feedback(&prev, &next) - expected).abs() < 1e-12);
    }

    #[test]
    fn final_delivery_gates() {
        let targets = DeliveryTargets::default();
        let one_log = DeliveryCounts {
            logs: 1,
            stones: 0,
            fuel: 0,
        };
        let quota = DeliveryCounts {
            logs: 2,
            stones: 3,
            fuel: 0,
        };
        assert!(FinalDeliveryGate::AtLeastOneLog.allows(&one_log, &targets));
        assert!(!FinalDeliveryGate::Quota.allows(&one_log, &targets));
        assert!(FinalDeliveryGate::Quota.allows(&quota, &targets));
    }

    #[test]
    fn json_round_trip_fills_defaults() {
        let json = r#"{
            "board_width": 3,
            "board_height": 3,
            "start": {"x": 2, "y": 1},
            "delivery_zone": {"x": 2, "y": 2},
            "filling_station": {"x": 0, "y": 0},
            "max_satiety": 11.0,
            "max_time": 50.0,
            "log_cells": [{"position": {"x": 2, "y": 0}, "quantity": 4}],
            "stone_cells": [{"position": {"x": 0, "y": 2}, "quantity": 6}]
        }"#;
        let catalog = RuleCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog, tiny());
        assert_eq!(catalog.final_delivery_gate, FinalDeliveryGate::AtLeastOneLog);
        assert!(!catalog.fast_pace);

        let reparsed = RuleCatalog::from_json_str(&catalog.to_json_string().unwrap()).unwrap();
        assert_eq!(reparsed, catalog);
    }
}
