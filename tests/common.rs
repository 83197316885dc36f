//! Common test utilities for the campfire test suite.
//!
//! Graph-wide invariant checks shared by the generator tests.

#![allow(dead_code)]

use campfire::{
    scenarios,
    types::ActionKind,
    world::{DeliveryTargets, RuleCatalog, StateGraph},
};

pub const TOLERANCE: f64 = 1e-9;

/// The tiny board with a shortened time budget, small enough to explore fast.
pub fn short_tiny_board(max_time: f64) -> RuleCatalog {
    scenarios::tiny_board().with_max_time(max_time)
}

/// Single-cell board where the agent stands on its only log and on the
/// delivery zone; one log and one fuel delivery win.
pub fn single_cell_board() -> RuleCatalog {
    RuleCatalog::new(1, 1, (0, 0))
        .with_delivery_zone((0, 0))
        .with_filling_station((0, 0))
        .with_max_satiety(10.0)
        .with_max_time(10.0)
        .add_log_cell((0, 0), 1)
        .with_targets(DeliveryTargets {
            logs: 1,
            stones: 0,
            fuel: 1,
        })
}

/// Every non-terminal state's outgoing probabilities sum to one.
pub fn assert_probability_conservation(graph: &StateGraph) {
    for (id, state) in graph.states() {
        if graph.is_terminal(id) {
            continue;
        }
        let total = graph.outgoing_probability(id);
        assert!(
            (total - 1.0).abs() <= TOLERANCE,
            "state {id} ({state}) has outgoing probability {total}"
        );
        for transition in graph.transitions_from(id) {
            assert!(
                transition.probability > 0.0,
                "state {id} has a zero-probability {} edge",
                transition.action_name()
            );
        }
    }
}

/// Accepting and failing sets are disjoint and terminal states have no edges.
pub fn assert_terminal_exclusivity(graph: &StateGraph) {
    for id in graph.accepting_states() {
        assert!(!graph.is_failing(*id), "state {id} is both accepting and failing");
        assert!(graph.edges(*id).is_empty(), "accepting state {id} has edges");
    }
    for id in graph.failing_states() {
        assert!(graph.edges(*id).is_empty(), "failing state {id} has edges");
    }
    for (id, _) in graph.states() {
        if !graph.is_terminal(id) {
            assert!(
                !graph.edges(id).is_empty(),
                "non-terminal state {id} has no edges"
            );
        }
    }
}

/// Time never increases along an edge; satiety only increases on refuel.
pub fn assert_monotonic_depletion(graph: &StateGraph) {
    for (id, state) in graph.states() {
        for edge in graph.edges(id) {
            let next = graph.state(edge.target);
            assert!(
                next.remaining_time < state.remaining_time,
                "time did not decrease on {id} -> {}",
                edge.target
            );
            if edge.transition.kind != ActionKind::Refuel {
                assert!(
                    next.satiety <= state.satiety,
                    "satiety grew on {} from {id}",
                    edge.transition.action_name()
                );
            }
        }
    }
}

pub fn assert_graph_invariants(graph: &StateGraph) {
    assert_probability_conservation(graph);
    assert_terminal_exclusivity(graph);
    assert_monotonic_depletion(graph);
}
