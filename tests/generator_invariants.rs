//! Graph-wide properties of the state-space generator

mod common;

use campfire::{
    Error,
    adapters::StatsObserver,
    mdp::{SolverConfig, ValueIteration},
    types::{ActionKind, Delivery},
    world::{FailureReason, FinalDeliveryGate, Generator, RuleCatalog, generate},
};
use common::*;

#[test]
fn short_tiny_board_satisfies_graph_invariants() {
    let catalog = short_tiny_board(20.0);
    let graph = generate(catalog.initial_state(), &catalog).unwrap();

    assert!(graph.len() > 1);
    assert!(!graph.failing_states().is_empty());
    assert_graph_invariants(&graph);

    let stats = graph.stats();
    assert_eq!(stats.total_states, graph.len());
    assert_eq!(stats.transitions, graph.transition_count());
    assert!(stats.final_ratio() <= 1.0);
}

#[test]
fn fast_pace_adds_fast_moves_and_keeps_invariants() {
    let catalog = short_tiny_board(10.0).with_fast_pace(true);
    let graph = generate(catalog.initial_state(), &catalog).unwrap();
    assert_graph_invariants(&graph);

    let fast_edges = graph
        .states()
        .flat_map(|(id, _)| graph.transitions_from(id))
        .filter(|t| t.kind == ActionKind::FastMove)
        .count();
    assert!(fast_edges > 0, "expected fast moves with fast pace enabled");

    let slow = short_tiny_board(10.0);
    let slow_graph = generate(slow.initial_state(), &slow).unwrap();
    assert!(graph.len() > slow_graph.len());
}

#[test]
fn generation_is_deterministic() {
    let catalog = short_tiny_board(16.0);
    let first = generate(catalog.initial_state(), &catalog).unwrap();
    let second = generate(catalog.initial_state(), &catalog).unwrap();

    assert_eq!(first.stats(), second.stats());
    assert_eq!(first.accepting_states(), second.accepting_states());
    assert_eq!(first.failing_states(), second.failing_states());
    for (id, state) in first.states() {
        assert_eq!(state, second.state(id));
        assert_eq!(first.edges(id), second.edges(id));
    }
}

#[test]
fn starved_initial_state_is_failing_without_edges() {
    let catalog = scenarios_tiny();
    let mut initial = catalog.initial_state();
    initial.satiety = 0.0;

    let graph = generate(initial, &catalog).unwrap();
    assert_eq!(graph.len(), 1);
    let root = graph.initial();
    assert!(graph.is_failing(root));
    assert!(graph.edges(root).is_empty());
    assert_eq!(graph.failure_reason(root), Some(FailureReason::Starved));
}

#[test]
fn exhausted_time_is_failing() {
    let catalog = scenarios_tiny();
    let mut initial = catalog.initial_state();
    initial.remaining_time = 0.0;

    let graph = generate(initial, &catalog).unwrap();
    assert_eq!(graph.failure_reason(graph.initial()), Some(FailureReason::OutOfTime));
}

#[test]
fn state_limit_aborts_generation() {
    let catalog = short_tiny_board(30.0).with_max_states(500);
    match generate(catalog.initial_state(), &catalog) {
        Err(Error::StateLimitExceeded { limit }) => assert_eq!(limit, 500),
        other => panic!("expected state limit error, got {:?}", other.map(|g| g.len())),
    }
}

#[test]
fn out_of_board_start_is_a_configuration_error() {
    let catalog = RuleCatalog::new(3, 3, (0, 3));
    let initial = campfire::State::new((0, 0).into(), 5.0, 5.0);
    assert!(matches!(
        generate(initial, &catalog),
        Err(Error::OutOfBoard { .. })
    ));
}

#[test]
fn near_full_reservation_keeps_every_edge_positive() {
    let board = |reserved: f64| {
        RuleCatalog::new(3, 3, (1, 1))
            .with_delivery_zone((2, 2))
            .with_filling_station((0, 0))
            .with_max_satiety(6.0)
            .with_max_time(8.0)
            .add_log_cell((1, 1), 2)
            .with_preferences(0.8, reserved)
    };

    let catalog = board(0.99);
    let graph = generate(catalog.initial_state(), &catalog).unwrap();
    assert_graph_invariants(&graph);

    let full = board(1.0);
    assert!(matches!(
        generate(full.initial_state(), &full),
        Err(Error::InvalidConfiguration { .. })
    ));
}

#[test]
fn colocated_log_cells_are_a_configuration_error() {
    let catalog = single_cell_board().add_log_cell((0, 0), 3);
    assert!(matches!(
        Generator::new(&catalog),
        Err(Error::InvalidConfiguration { .. })
    ));
}

#[test]
fn fuel_deliveries_respect_the_configured_gate() {
    for gate in [FinalDeliveryGate::AtLeastOneLog, FinalDeliveryGate::Quota] {
        let catalog = short_tiny_board(24.0).with_final_delivery_gate(gate);
        let graph = generate(catalog.initial_state(), &catalog).unwrap();
        for (id, state) in graph.states() {
            for transition in graph.transitions_from(id) {
                if transition.item == Some(Delivery::Fuel) {
                    assert!(
                        gate.allows(&state.delivered_counts(), &catalog.targets),
                        "fuel delivered from {state} under {gate:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn single_cell_board_can_be_won() {
    let catalog = single_cell_board();
    let graph = generate(catalog.initial_state(), &catalog).unwrap();
    assert_graph_invariants(&graph);

    let root = graph.initial();
    let first: Vec<_> = graph.transitions_from(root).collect();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].action_name(), "load-log");
    assert!((first[0].probability - 1.0).abs() < TOLERANCE);

    assert!(!graph.accepting_states().is_empty());
    for id in graph.accepting_states() {
        let state = graph.state(*id);
        assert!(state.ignited);
        assert!(state.is_right_amount(&catalog.targets));
    }

    let unload = graph
        .states()
        .flat_map(|(id, _)| graph.transitions_from(id))
        .find(|t| t.action_name() == "unload-log")
        .expect("the log must be deliverable");
    assert!((unload.feedback - (0.2 * -0.1 + 0.1 * -1.0 + 5.0)).abs() < 1e-9);
}

#[test]
fn observers_see_every_state_once() {
    let catalog = short_tiny_board(14.0);
    let observer = StatsObserver::new();
    let handle = observer.handle();
    let graph = Generator::new(&catalog)
        .unwrap()
        .with_observer(Box::new(observer))
        .generate(catalog.initial_state())
        .unwrap();

    let counts = handle.lock().unwrap().clone();
    assert_eq!(counts.generations, 1);
    assert_eq!(counts.accepting, graph.accepting_states().len());
    assert_eq!(counts.failing(), graph.failing_states().len());
    assert_eq!(
        counts.expanded + counts.accepting + counts.failing(),
        graph.len()
    );
    assert_eq!(counts.final_stats, Some(graph.stats()));
}

#[test]
fn projected_graph_is_solvable() {
    let catalog = single_cell_board();
    let graph = generate(catalog.initial_state(), &catalog).unwrap();
    let mdp = graph.to_mdp();
    assert_eq!(mdp.len(), graph.len());
    assert_eq!(mdp.accepting_states().len(), graph.accepting_states().len());
    assert!(mdp.validate().is_ok());

    let solution = ValueIteration::new(SolverConfig::new(0.9, 1e-6))
        .solve(&mdp)
        .unwrap();
    let root = graph.initial().to_string();
    assert_eq!(
        solution.action_for(&root).map(|a| a.as_str()),
        Some("load-log")
    );
    assert!(solution.values.values().all(|v| v.is_finite()));
}

#[test]
fn projected_failing_states_do_not_depend_on_the_seed() {
    let two_cells = RuleCatalog::new(2, 1, (0, 0))
        .with_max_satiety(3.0)
        .with_max_time(3.0);
    for catalog in [two_cells, short_tiny_board(12.0)] {
        let graph = generate(catalog.initial_state(), &catalog).unwrap();
        assert!(!graph.failing_states().is_empty());
        let mdp = graph.to_mdp();

        let zero = ValueIteration::new(SolverConfig::new(0.5, 1e-9))
            .solve(&mdp)
            .unwrap();
        let seeded = ValueIteration::new(SolverConfig::new(0.5, 1e-9).with_seed(7, 0.0, 100.0))
            .solve(&mdp)
            .unwrap();

        for id in graph.failing_states() {
            let name = id.to_string();
            assert_eq!(seeded.value_of(&name), Some(0.0), "failing state {name}");
        }
        for (state, value) in &zero.values {
            assert!(
                (seeded.values[state] - value).abs() < 1e-6,
                "{state}: zero-seeded {value} vs uniform-seeded {}",
                seeded.values[state]
            );
        }
    }
}

fn scenarios_tiny() -> RuleCatalog {
    campfire::scenarios::tiny_board()
}
