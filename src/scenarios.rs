//! Built-in scenarios
//!
//! - [`tiny_board`]: a 3x3 grid with one log cell and one stone cell
//! - [`study_party`]: a seven-state study-or-party decision graph

use crate::{
    mdp::{MdpGraph, SolverConfig},
    world::RuleCatalog,
};

/// 3x3 board: start (2, 1), delivery zone (2, 2), filling station (0, 0),
/// four logs at (2, 0), six stones at (0, 2), satiety 11, time 50.
pub fn tiny_board() -> RuleCatalog {
    RuleCatalog::new(3, 3, (2, 1))
        .with_delivery_zone((2, 2))
        .with_filling_station((0, 0))
        .with_max_satiety(11.0)
        .with_max_time(50.0)
        .add_log_cell((2, 0), 4)
        .add_stone_cell((0, 2), 6)
}

pub const READING_DAY_1: &str = "ReadingDay1";
pub const READING_DAY_2: &str = "ReadingDay2";
pub const READING_DAY_3: &str = "ReadingDay3";
pub const PARTY_1: &str = "Party1";
pub const PARTY_2: &str = "Party2";
pub const PARTY_3: &str = "Party3";
pub const PASSED_EXAM: &str = "PassedExam";

/// Three reading days, each tempting a party that ends in a headache.
///
/// Studying costs reward now and moves towards the exam; partying pays off
/// immediately but leads back with a headache, sometimes a strong one that
/// drops a day. `PassedExam` is accepting.
pub fn study_party() -> MdpGraph {
    MdpGraph::builder()
        .state(READING_DAY_1)
        .state(READING_DAY_2)
        .state(READING_DAY_3)
        .state(PARTY_1)
        .state(PARTY_2)
        .state(PARTY_3)
        .state(PASSED_EXAM)
        .outcome(READING_DAY_1, "study", READING_DAY_2, 0.7, -2.0)
        .outcome(READING_DAY_1, "party!", PARTY_1, 0.3, 1.0)
        .outcome(PARTY_1, "headache", READING_DAY_1, 1.0, -2.0)
        .outcome(READING_DAY_2, "study", READING_DAY_3, 0.8, -2.0)
        .outcome(READING_DAY_2, "party!", PARTY_2, 0.2, 1.0)
        .outcome(PARTY_2, "headache", READING_DAY_2, 0.8, -1.0)
        .outcome(PARTY_2, "strong headache", PARTY_1, 0.2, -1.0)
        .outcome(READING_DAY_3, "study&pass", PASSED_EXAM, 0.9, 10.0)
        .outcome(READING_DAY_3, "party!", PARTY_3, 0.1, 1.0)
        .outcome(PARTY_3, "headache", READING_DAY_3, 0.8, -1.0)
        .outcome(PARTY_3, "strong headache", PARTY_2, 0.2, -1.0)
        .accepting(PASSED_EXAM)
        .initial(READING_DAY_1)
        .build_unchecked()
}

/// Solver settings the study/party graph is usually run with: γ = 0.5, θ = 0.01.
pub fn study_party_config() -> SolverConfig {
    SolverConfig::new(0.5, 0.01)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::DecisionProcess;

    #[test]
    fn study_party_is_consistent() {
        let graph = study_party();
        assert!(graph.validate().is_ok());
        assert_eq!(graph.len(), 7);
        assert_eq!(graph.outcome_count(), 11);
        assert_eq!(graph.accepting_states().len(), 1);
    }

    #[test]
    fn outgoing_mass_sums_to_one_per_state() {
        let graph = study_party();
        for state in graph.state_names() {
            if graph.is_accepting(state) {
                continue;
            }
            let total: f64 = graph
                .action_names(state)
                .into_iter()
                .flat_map(|action| graph.outcomes(state, action))
                .map(|outcome| outcome.probability)
                .sum();
            assert!((total - 1.0).abs() < 1e-12, "{state} sums to {total}");
        }
    }

    #[test]
    fn tiny_board_validates() {
        let catalog = tiny_board();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.initial_state().log_cells, vec![4]);
    }
}
