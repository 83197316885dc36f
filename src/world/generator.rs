//! Exhaustive transition generation
//!
//! The generator walks the reachable state space depth-first with an explicit
//! stack of frames, interning every state it meets. Each frame carries the cell
//! the agent came from so that movement never immediately backtracks. A state
//! is expanded at most once; revisits are merge points of the graph.
//!
//! Outgoing probabilities follow the movement-preference heuristic: when the
//! agent risks starving before reaching the filling station, or carries an
//! item, part of the probability mass is reserved for the best-ranked direction
//! towards the station or the delivery zone. The rest is shared evenly by
//! every other enabled action.

use super::{
    catalog::{RuleCatalog, costs},
    geometry::{best_direction, legal_directions},
    graph::{Edge, FailureReason, StateGraph, StateTable, Transition},
    state::State,
};
use crate::{
    Error, Result,
    identifiers::StateId,
    ports::Observer,
    types::{ActionKind, Coord, Delivery, Direction, Item, PROBABILITY_TOLERANCE, Pace},
};

/// Generate the full transition graph reachable from `initial`.
///
/// # Errors
///
/// Returns a configuration error for an invalid catalog or initial state,
/// [`Error::ProbabilityInvariant`] if a state's outgoing probabilities do not
/// sum to one and [`Error::StateLimitExceeded`] when `max_states` or the
/// identifier capacity is hit.
pub fn generate(initial: State, catalog: &RuleCatalog) -> Result<StateGraph> {
    Generator::new(catalog)?.generate(initial)
}

/// Terminal classification decided before expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminal {
    Accepting,
    Failing(FailureReason),
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    id: StateId,
    previous: Coord,
}

/// Probability mass reserved for the preferred directions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Preference {
    station: f64,
    delivery: f64,
}

/// Depth-first state-space generator bound to one rule catalog.
pub struct Generator<'a> {
    catalog: &'a RuleCatalog,
    observers: Vec<Box<dyn Observer>>,
}

impl<'a> Generator<'a> {
    /// Create a generator after validating the catalog.
    pub fn new(catalog: &'a RuleCatalog) -> Result<Self> {
        catalog.validate()?;
        Ok(Self {
            catalog,
            observers: Vec::new(),
        })
    }

    /// Add an observer notified of generation events
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn catalog(&self) -> &RuleCatalog {
        self.catalog
    }

    /// Explore every state reachable from `initial`.
    pub fn generate(&mut self, initial: State) -> Result<StateGraph> {
        self.catalog.validate_state(&initial)?;
        for observer in &mut self.observers {
            observer.on_generation_start(&initial)?;
        }

        let start_cell = initial.position;
        let mut table = StateTable::new();
        let (root, _) = table.intern(initial)?;
        let mut graph = StateGraph::new(table, root);
        let mut expanded = vec![false; graph.len()];
        let mut stack = vec![Frame {
            id: root,
            previous: start_cell,
        }];

        while let Some(frame) = stack.pop() {
            let index = frame.id.index();
            if expanded.len() < graph.len() {
                expanded.resize(graph.len(), false);
            }
            if expanded[index] {
                continue;
            }
            expanded[index] = true;

            let state = graph.state(frame.id).clone();
            match self.classify(&state) {
                Some(Terminal::Accepting) => {
                    graph.mark_accepting(frame.id);
                    for observer in &mut self.observers {
                        observer.on_accepting(frame.id, &state)?;
                    }
                    continue;
                }
                Some(Terminal::Failing(reason)) => {
                    self.fail(&mut graph, frame.id, &state, reason)?;
                    continue;
                }
                None => {}
            }

            let successors = self.expand(&state, frame.previous);
            if successors.is_empty() {
                self.fail(
                    &mut graph,
                    frame.id,
                    &state,
                    FailureReason::NoAffordableAction,
                )?;
                continue;
            }
            check_probability_sum(frame.id, &state, &successors)?;

            let mut edges = Vec::with_capacity(successors.len());
            for (next, transition) in successors {
                let (target, fresh) = graph.table_mut().intern(next)?;
                if fresh {
                    if let Some(limit) = self.catalog.max_states {
                        if graph.len() > limit {
                            return Err(Error::StateLimitExceeded { limit });
                        }
                    }
                }
                edges.push(Edge { target, transition });
            }

            for observer in &mut self.observers {
                observer.on_state_expanded(frame.id, &state, edges.len())?;
            }
            for edge in edges.iter().rev() {
                if !expanded.get(edge.target.index()).copied().unwrap_or(false) {
                    stack.push(Frame {
                        id: edge.target,
                        previous: state.position,
                    });
                }
            }
            graph.set_edges(frame.id, edges);
        }

        graph.finish();
        let stats = graph.stats();
        for observer in &mut self.observers {
            observer.on_generation_end(&stats)?;
        }
        Ok(graph)
    }

    fn fail(
        &mut self,
        graph: &mut StateGraph,
        id: StateId,
        state: &State,
        reason: FailureReason,
    ) -> Result<()> {
        graph.mark_failing(id, reason);
        for observer in &mut self.observers {
            observer.on_failing(id, state, reason)?;
        }
        Ok(())
    }

    fn classify(&self, state: &State) -> Option<Terminal> {
        if state.ignited && state.remaining_time >= 0.0 {
            Some(Terminal::Accepting)
        } else if state.remaining_time <= 0.0 {
            Some(Terminal::Failing(FailureReason::OutOfTime))
        } else if state.satiety <= 0.0 {
            Some(Terminal::Failing(FailureReason::Starved))
        } else {
            None
        }
    }

    /// Enumerate every enabled action with its probability and reward.
    ///
    /// Non-movement actions come first in priority order, followed by
    /// normal-pace and then fast-pace moves in direction order.
    fn expand(&self, state: &State, previous: Coord) -> Vec<(State, Transition)> {
        let mut actions = self.handling_actions(state);

        let directions = legal_directions(
            state.position,
            previous,
            self.catalog.board_width,
            self.catalog.board_height,
        );
        let normal_cost = move_cost(state, Pace::Normal);
        let fast_cost = move_cost(state, Pace::Fast);
        let normal_pace = !directions.is_empty()
            && state.satiety >= normal_cost
            && state.remaining_time >= costs::STEP_TIME;
        let fast_pace = self.has_room_and_satiety_for_fast_pace(state, &directions, fast_cost);
        let mut paces = Vec::with_capacity(2);
        if normal_pace {
            paces.push(Pace::Normal);
        }
        if fast_pace {
            paces.push(Pace::Fast);
        }

        let preference = if paces.is_empty() {
            Preference::default()
        } else {
            self.preference(state)
        };
        let station_dir = (preference.station > 0.0)
            .then(|| best_direction(&directions, self.catalog.filling_station))
            .flatten();
        let delivery_dir = (preference.delivery > 0.0)
            .then(|| best_direction(&directions, self.catalog.delivery_zone))
            .flatten();
        let reserved_for = |dir: Direction| {
            let mut mass = 0.0;
            if station_dir == Some(dir) {
                mass += preference.station;
            }
            if delivery_dir == Some(dir) {
                mass += preference.delivery;
            }
            mass
        };

        let preferred_count = directions
            .iter()
            .filter(|(dir, _)| reserved_for(*dir) > 0.0)
            .count();
        let reserved_total: f64 = directions.iter().map(|(dir, _)| reserved_for(*dir)).sum();
        let other_count = actions.len() + (directions.len() - preferred_count) * paces.len();

        // With nothing else enabled the reserved mass is rescaled to cover everything.
        let (share, scale) = if other_count > 0 {
            ((1.0 - reserved_total) / other_count as f64, 1.0)
        } else if reserved_total > 0.0 {
            (0.0, 1.0 / reserved_total)
        } else {
            (0.0, 1.0)
        };

        for (_, transition) in actions.iter_mut() {
            transition.probability = share;
        }

        for &pace in &paces {
            let (satiety_cost, time_cost) = match pace {
                Pace::Normal => (normal_cost, costs::STEP_TIME),
                Pace::Fast => (fast_cost, costs::FAST_STEP_TIME),
            };
            for &(dir, cell) in &directions {
                let mut next = state.successor();
                next.satiety -= satiety_cost;
                next.remaining_time -= time_cost;
                next.position = cell;
                let mut transition = Transition::movement(dir, pace);
                let reserved = reserved_for(dir);
                transition.probability = if reserved > 0.0 {
                    reserved * scale / paces.len() as f64
                } else {
                    share
                };
                actions.push(self.label(state, next, transition));
            }
        }

        actions
    }

    /// Deliver, ignite, pick-up and refuel actions in priority order.
    fn handling_actions(&self, state: &State) -> Vec<(State, Transition)> {
        let catalog = self.catalog;
        let mut actions = Vec::new();
        let at_delivery = state.position == catalog.delivery_zone;
        let has_time = state.remaining_time >= costs::STEP_TIME;
        let can_handle = has_time && state.satiety >= costs::HANDLING_MIN_SATIETY;
        let counts = state.delivered_counts();

        if at_delivery
            && has_time
            && state.satiety >= costs::FINAL_DELIVERY_MIN_SATIETY
            && catalog
                .final_delivery_gate
                .allows(&counts, &catalog.targets)
        {
            let mut next = state.successor();
            next.satiety -= costs::FINAL_DELIVERY;
            next.remaining_time -= costs::STEP_TIME;
            next.delivered.push(Delivery::Fuel);
            self.bump_progress(&mut next);
            let transition = Transition::new(ActionKind::Unload).with_item(Delivery::Fuel);
            actions.push(self.label(state, next, transition));
        }

        if at_delivery && can_handle && counts.meets(&catalog.targets) {
            let mut next = state.successor();
            next.satiety -= costs::HANDLING;
            next.remaining_time -= costs::STEP_TIME;
            next.ignited = true;
            self.bump_progress(&mut next);
            actions.push(self.label(state, next, Transition::new(ActionKind::Ignite)));
        }

        if let Some(item) = state.cargo {
            if at_delivery && can_handle {
                let mut next = state.successor();
                next.satiety -= costs::HANDLING;
                next.remaining_time -= costs::STEP_TIME;
                next.cargo = None;
                next.delivered.push(Delivery::from(item));
                self.bump_progress(&mut next);
                let transition = Transition::new(ActionKind::Unload).with_item(item);
                actions.push(self.label(state, next, transition));
            }
        }

        if state.cargo.is_none() && can_handle {
            for item in [Item::Log, Item::Stone] {
                for (i, cell) in catalog.cells(item).iter().enumerate() {
                    let remaining = match item {
                        Item::Log => state.log_cells[i],
                        Item::Stone => state.stone_cells[i],
                    };
                    if cell.position != state.position || remaining == 0 {
                        continue;
                    }
                    let mut next = state.successor();
                    next.satiety -= costs::HANDLING;
                    next.remaining_time -= costs::STEP_TIME;
                    next.cargo = Some(item);
                    match item {
                        Item::Log => next.log_cells[i] -= 1,
                        Item::Stone => next.stone_cells[i] -= 1,
                    }
                    let transition = Transition::new(ActionKind::Load).with_item(item);
                    actions.push(self.label(state, next, transition));
                }
            }
        }

        if state.position == catalog.filling_station
            && has_time
            && state.satiety > 0.0
            && state.satiety < catalog.max_satiety
        {
            let mut next = state.successor();
            next.remaining_time -= costs::STEP_TIME;
            next.satiety = catalog.max_satiety.min(state.satiety + catalog.refuel_amount);
            actions.push(self.label(state, next, Transition::new(ActionKind::Refuel)));
        }

        actions
    }

    /// Fast moves are enabled by the catalog and need satiety for the doubled cost.
    pub fn has_room_and_satiety_for_fast_pace(
        &self,
        state: &State,
        directions: &[(Direction, Coord)],
        fast_cost: f64,
    ) -> bool {
        self.catalog.fast_pace
            && !directions.is_empty()
            && state.satiety >= fast_cost
            && state.remaining_time >= costs::FAST_STEP_TIME
    }

    fn preference(&self, state: &State) -> Preference {
        let catalog = self.catalog;
        let station_distance = state.position.distance(&catalog.filling_station).floor();
        let eat = if station_distance >= state.satiety {
            1.0 - state.satiety / (state.satiety + 1.0)
        } else {
            0.0
        };
        let unload = if state.is_carrying() {
            let distance = state.position.distance(&catalog.delivery_zone).floor();
            distance / (distance + 1.0)
        } else {
            0.0
        };

        let blend = catalog.eat_vs_unload_preference;
        let trade_off = blend * eat + (1.0 - blend) * unload;
        if trade_off <= 0.0 {
            return Preference::default();
        }
        let reserved = catalog.eat_and_unload_vs_rest_preference;
        Preference {
            station: reserved * blend * eat / trade_off,
            delivery: reserved * (1.0 - blend) * unload / trade_off,
        }
    }

    fn bump_progress(&self, state: &mut State) {
        if state.is_progress_positive(&self.catalog.targets) {
            state.game_progress += 1;
        }
    }

    fn label(&self, prev: &State, next: State, mut transition: Transition) -> (State, Transition) {
        transition.feedback = self.catalog.feedback(prev, &next);
        (next, transition)
    }
}

fn move_cost(state: &State, pace: Pace) -> f64 {
    match (pace, state.is_carrying()) {
        (Pace::Normal, false) => costs::MOVE,
        (Pace::Normal, true) => costs::MOVE + costs::LOADED_MOVE_SURCHARGE,
        (Pace::Fast, false) => costs::FAST_MOVE,
        (Pace::Fast, true) => costs::FAST_MOVE + costs::LOADED_FAST_MOVE_SURCHARGE,
    }
}

fn check_probability_sum(
    id: StateId,
    state: &State,
    successors: &[(State, Transition)],
) -> Result<()> {
    let total: f64 = successors.iter().map(|(_, t)| t.probability).sum();
    let in_range = successors
        .iter()
        .all(|(_, t)| (0.0..=1.0 + PROBABILITY_TOLERANCE).contains(&t.probability));
    let valid = (total - 1.0).abs() <= PROBABILITY_TOLERANCE && in_range;
    debug_assert!(
        valid,
        "outgoing probabilities of {id} sum to {total}: {state} -> {successors:?}"
    );
    if valid {
        return Ok(());
    }
    Err(Error::ProbabilityInvariant {
        state: format!("{id} {state}"),
        total,
        tolerance: PROBABILITY_TOLERANCE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_board() -> RuleCatalog {
        RuleCatalog::new(3, 3, (1, 1))
            .with_delivery_zone((2, 2))
            .with_filling_station((0, 0))
            .with_max_satiety(10.0)
            .with_max_time(6.0)
    }

    fn probability_of(actions: &[(State, Transition)], name: &str) -> f64 {
        actions
            .iter()
            .find(|(_, t)| t.action_name() == name)
            .map(|(_, t)| t.probability)
            .unwrap_or_else(|| panic!("no action named {name}"))
    }

    /// Two moves out of the open board's start carrying `first` and `second`.
    fn two_moves(first: f64, second: f64) -> (State, Vec<(State, Transition)>) {
        let state = open_board().initial_state();
        let successors = [(Direction::North, first), (Direction::East, second)]
            .into_iter()
            .map(|(direction, probability)| {
                let mut transition = Transition::movement(direction, Pace::Normal);
                transition.probability = probability;
                (state.clone(), transition)
            })
            .collect();
        (state, successors)
    }

    #[test]
    fn probability_sum_of_one_passes() {
        let (state, successors) = two_moves(0.7, 0.3);
        assert!(check_probability_sum(StateId::from_index(0), &state, &successors).is_ok());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outgoing probabilities of s0 sum to")]
    fn short_probability_sum_panics_in_debug_builds() {
        let (state, successors) = two_moves(0.6, 0.3);
        let _ = check_probability_sum(StateId::from_index(0), &state, &successors);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn short_probability_sum_is_an_error_in_release_builds() {
        let (state, successors) = two_moves(0.6, 0.3);
        match check_probability_sum(StateId::from_index(0), &state, &successors) {
            Err(Error::ProbabilityInvariant { state, total, tolerance }) => {
                assert!((total - 0.9).abs() < 1e-12);
                assert_eq!(tolerance, PROBABILITY_TOLERANCE);
                assert!(state.starts_with("s0 "));
            }
            other => panic!("expected probability invariant error, got {other:?}"),
        }
    }

    #[test]
    fn unconstrained_moves_are_equiprobable() {
        let catalog = open_board();
        let generator = Generator::new(&catalog).unwrap();
        let state = catalog.initial_state();
        let actions = generator.expand(&state, state.position);
        assert_eq!(actions.len(), 4);
        for (_, transition) in &actions {
            assert!((transition.probability - 0.25).abs() < 1e-12);
            assert_eq!(transition.kind, ActionKind::Move);
        }
    }

    #[test]
    fn carrying_reserves_mass_towards_delivery_zone() {
        let catalog = open_board();
        let generator = Generator::new(&catalog).unwrap();
        let mut state = catalog.initial_state();
        state.position = Coord::new(0, 1);
        state.cargo = Some(Item::Log);
        // From (0, 1) with previous (0, 0): north (0, 2) and east (1, 1) remain.
        let actions = generator.expand(&state, Coord::new(0, 0));
        assert_eq!(actions.len(), 2);
        // East is closer to (2, 2) than north; it takes the reserved 0.7.
        assert!((probability_of(&actions, "move-east") - 0.7).abs() < 1e-12);
        assert!((probability_of(&actions, "move-north") - 0.3).abs() < 1e-12);
    }

    #[test]
    fn low_satiety_reserves_mass_towards_station() {
        let catalog = open_board();
        let generator = Generator::new(&catalog).unwrap();
        let mut state = catalog.initial_state();
        state.position = Coord::new(2, 2);
        state.satiety = 2.0;
        // floor(dist((2,2),(0,0))) = 2 >= satiety, so the station is preferred.
        let actions = generator.expand(&state, Coord::new(2, 2));
        let total: f64 = actions.iter().map(|(_, t)| t.probability).sum();
        assert!((total - 1.0).abs() < 1e-12);
        let south = probability_of(&actions, "move-south");
        let west = probability_of(&actions, "move-west");
        // (2, 1) and (1, 2) are equally close; south wins by enumeration order.
        assert!(south > west);
        assert!((south - 0.7).abs() < 1e-12);
    }

    #[test]
    fn handling_actions_share_the_remaining_mass() {
        let catalog = open_board().add_log_cell((1, 1), 2);
        let generator = Generator::new(&catalog).unwrap();
        let state = catalog.initial_state();
        let actions = generator.expand(&state, state.position);
        assert_eq!(actions.len(), 5);
        assert_eq!(actions[0].1.action_name(), "load-log");
        for (_, transition) in &actions {
            assert!((transition.probability - 0.2).abs() < 1e-12);
        }
        let (loaded, _) = &actions[0];
        assert_eq!(loaded.cargo, Some(Item::Log));
        assert_eq!(loaded.log_cells, vec![1]);
        assert!((loaded.satiety - 9.9).abs() < 1e-12);
        assert_eq!(loaded.remaining_time, 5.0);
    }

    #[test]
    fn deliveries_come_before_movement_and_bump_progress() {
        let catalog = open_board();
        let generator = Generator::new(&catalog).unwrap();
        let mut state = catalog.initial_state();
        state.position = Coord::new(2, 2);
        state.cargo = Some(Item::Stone);
        let actions = generator.expand(&state, Coord::new(2, 2));
        let (delivered, transition) = &actions[0];
        assert_eq!(transition.kind, ActionKind::Unload);
        assert_eq!(transition.item, Some(Delivery::Stone));
        assert_eq!(delivered.delivered, vec![Delivery::Stone]);
        assert_eq!(delivered.cargo, None);
        assert_eq!(delivered.game_progress, 1);
        let expected = 0.2 * -0.1 + 0.1 * -1.0 + 5.0;
        assert!((transition.feedback - expected).abs() < 1e-9);
    }

    #[test]
    fn ignition_requires_right_amount() {
        let catalog = open_board();
        let generator = Generator::new(&catalog).unwrap();
        let mut state = catalog.initial_state();
        state.position = Coord::new(2, 2);
        state.delivered = vec![
            Delivery::Log,
            Delivery::Log,
            Delivery::Stone,
            Delivery::Stone,
            Delivery::Stone,
        ];
        let actions = generator.expand(&state, Coord::new(2, 2));
        assert!(actions.iter().all(|(_, t)| t.kind != ActionKind::Ignite));
        assert_eq!(actions[0].1.action_name(), "unload-fuel");

        state.delivered.push(Delivery::Fuel);
        let actions = generator.expand(&state, Coord::new(2, 2));
        let (ignited, _) = actions
            .iter()
            .find(|(_, t)| t.kind == ActionKind::Ignite)
            .expect("ignite should be enabled");
        assert!(ignited.ignited);
    }

    #[test]
    fn refuel_is_capped_at_max_satiety() {
        let catalog = open_board();
        let generator = Generator::new(&catalog).unwrap();
        let mut state = catalog.initial_state();
        state.position = Coord::new(0, 0);
        state.satiety = 7.0;
        let actions = generator.expand(&state, Coord::new(0, 0));
        let (refuelled, transition) = &actions[0];
        assert_eq!(transition.kind, ActionKind::Refuel);
        assert_eq!(refuelled.satiety, 10.0);
        assert!((transition.feedback - (0.2 * 3.0 - 0.1)).abs() < 1e-12);
    }

    #[test]
    fn fast_pace_is_gated_by_the_catalog() {
        let catalog = open_board();
        let generator = Generator::new(&catalog).unwrap();
        let state = catalog.initial_state();
        let directions = legal_directions(state.position, state.position, 3, 3);
        assert!(!generator.has_room_and_satiety_for_fast_pace(&state, &directions, 2.0));

        let fast = open_board().with_fast_pace(true);
        let generator = Generator::new(&fast).unwrap();
        assert!(generator.has_room_and_satiety_for_fast_pace(&state, &directions, 2.0));
        let actions = generator.expand(&state, state.position);
        assert_eq!(actions.len(), 8);
        let fast_moves: Vec<_> = actions.iter().filter(|(_, t)| t.is_fast()).collect();
        assert_eq!(fast_moves.len(), 4);
        for (next, transition) in fast_moves {
            assert_eq!(transition.kind, ActionKind::FastMove);
            assert_eq!(next.remaining_time, 5.5);
            assert_eq!(next.satiety, 8.0);
            assert!((transition.probability - 0.125).abs() < 1e-12);
        }
    }

    #[test]
    fn preferred_direction_mass_is_split_across_paces() {
        let catalog = open_board().with_fast_pace(true);
        let generator = Generator::new(&catalog).unwrap();
        let mut state = catalog.initial_state();
        state.position = Coord::new(0, 1);
        state.cargo = Some(Item::Log);
        let actions = generator.expand(&state, Coord::new(0, 0));
        assert!((probability_of(&actions, "move-east") - 0.35).abs() < 1e-12);
        assert!((probability_of(&actions, "fast-move-east") - 0.35).abs() < 1e-12);
        assert!((probability_of(&actions, "move-north") - 0.15).abs() < 1e-12);
        assert!((probability_of(&actions, "fast-move-north") - 0.15).abs() < 1e-12);
    }

    #[test]
    fn starved_state_is_failing() {
        let catalog = open_board();
        let generator = Generator::new(&catalog).unwrap();
        let mut state = catalog.initial_state();
        state.satiety = 0.0;
        assert_eq!(
            generator.classify(&state),
            Some(Terminal::Failing(FailureReason::Starved))
        );
    }
}
