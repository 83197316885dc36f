//! Q-table of expected returns per state-action pair

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identifiers::{ActionName, StateName};

/// Q-table mapping (state, action) pairs to expected discounted returns
///
/// Both levels are ordered maps, so iteration is lexicographic in state and
/// then action name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    q_values: BTreeMap<StateName, BTreeMap<ActionName, f64>>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: &str, action: &str) -> Option<f64> {
        self.q_values.get(state)?.get(action).copied()
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: StateName, action: ActionName, value: f64) {
        self.q_values.entry(state).or_default().insert(action, value);
    }

    /// All recorded actions of a state with their Q-values
    pub fn actions(&self, state: &str) -> Option<&BTreeMap<ActionName, f64>> {
        self.q_values.get(state)
    }

    /// Maximum Q-value over the recorded actions of a state
    pub fn max_q(&self, state: &str) -> Option<f64> {
        self.greedy_action(state).map(|(_, q)| q)
    }

    /// Action with the highest Q-value; ties go to the first action by name.
    pub fn greedy_action(&self, state: &str) -> Option<(&ActionName, f64)> {
        let mut best: Option<(&ActionName, f64)> = None;
        for (action, &q) in self.q_values.get(state)? {
            match best {
                Some((_, best_q)) if q <= best_q => {}
                _ => best = Some((action, q)),
            }
        }
        best
    }

    /// Iterate over `(state, action, q)` triples in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateName, &ActionName, f64)> {
        self.q_values
            .iter()
            .flat_map(|(state, actions)| actions.iter().map(move |(a, &q)| (state, a, q)))
    }

    /// Number of states with at least one recorded action
    pub fn state_count(&self) -> usize {
        self.q_values.len()
    }

    /// Get total number of Q-values stored
    pub fn size(&self) -> usize {
        self.q_values.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.q_values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> QTable {
        let mut qtable = QTable::new();
        qtable.set("R1".into(), "party!".into(), 0.5);
        qtable.set("R1".into(), "study".into(), 1.5);
        qtable.set("R2".into(), "study".into(), -0.8);
        qtable
    }

    #[test]
    fn test_qtable_set_get() {
        let qtable = table();
        assert_eq!(qtable.get("R1", "study"), Some(1.5));
        assert_eq!(qtable.get("R1", "sleep"), None);
        assert_eq!(qtable.get("R3", "study"), None);
        assert_eq!(qtable.size(), 3);
        assert_eq!(qtable.state_count(), 2);
    }

    #[test]
    fn test_greedy_action() {
        let qtable = table();
        let (action, q) = qtable.greedy_action("R1").unwrap();
        assert_eq!(action, &"study");
        assert_eq!(q, 1.5);
        assert_eq!(qtable.max_q("R2"), Some(-0.8));
        assert!(qtable.greedy_action("R3").is_none());
    }

    #[test]
    fn test_greedy_ties_prefer_first_name() {
        let mut qtable = QTable::new();
        qtable.set("s".into(), "b".into(), 1.0);
        qtable.set("s".into(), "a".into(), 1.0);
        qtable.set("s".into(), "c".into(), 1.0);
        assert_eq!(qtable.greedy_action("s").map(|(a, _)| a.as_str()), Some("a"));
    }

    #[test]
    fn test_iteration_order() {
        let triples: Vec<(String, String)> = table()
            .iter()
            .map(|(s, a, _)| (s.to_string(), a.to_string()))
            .collect();
        assert_eq!(
            triples,
            vec![
                ("R1".to_string(), "party!".to_string()),
                ("R1".to_string(), "study".to_string()),
                ("R2".to_string(), "study".to_string()),
            ]
        );
    }
}
