//! Named-state decision graphs

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    identifiers::{ActionName, StateName},
};

/// One possible result of taking an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub next: StateName,
    pub probability: f64,
    pub reward: f64,
}

/// The shape value iteration operates on.
///
/// Implementors expose a finite set of states, the actions available in each
/// state and the `(next, probability, reward)` outcomes of every action.
/// Probabilities are taken as given: they may sum to one per state rather than
/// per action.
pub trait DecisionProcess {
    /// Every state of the process, in ascending name order.
    fn state_names(&self) -> Vec<&StateName>;

    /// Actions available in `state`, in ascending name order.
    fn action_names(&self, state: &StateName) -> Vec<&ActionName>;

    /// Outcomes of taking `action` in `state`.
    fn outcomes(&self, state: &StateName, action: &ActionName) -> &[Outcome];

    /// Accepting states are absorbing and worth zero.
    fn is_accepting(&self, state: &StateName) -> bool;
}

/// Decision graph keyed by state and action names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MdpGraph {
    transitions: BTreeMap<StateName, BTreeMap<ActionName, Vec<Outcome>>>,
    accepting: BTreeSet<StateName>,
    initial: Option<StateName>,
}

impl MdpGraph {
    pub fn builder() -> MdpGraphBuilder {
        MdpGraphBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn contains(&self, state: &str) -> bool {
        self.transitions.contains_key(state)
    }

    pub fn initial(&self) -> Option<&StateName> {
        self.initial.as_ref()
    }

    pub fn accepting_states(&self) -> &BTreeSet<StateName> {
        &self.accepting
    }

    /// Total number of outcomes over all states and actions.
    pub fn outcome_count(&self) -> usize {
        self.transitions
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Check that every referenced state is declared and every probability
    /// lies in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if let Some(initial) = &self.initial {
            if !self.contains(initial.as_str()) {
                return Err(Error::UnknownState {
                    name: initial.to_string(),
                });
            }
        }
        for name in &self.accepting {
            if !self.contains(name.as_str()) {
                return Err(Error::UnknownState {
                    name: name.to_string(),
                });
            }
        }
        for (from, actions) in &self.transitions {
            for (action, outcomes) in actions {
                for outcome in outcomes {
                    if !self.contains(outcome.next.as_str()) {
                        return Err(Error::UnknownState {
                            name: outcome.next.to_string(),
                        });
                    }
                    if !(0.0..=1.0).contains(&outcome.probability) {
                        return Err(Error::InvalidProbability {
                            from: from.to_string(),
                            to: outcome.next.to_string(),
                            action: action.to_string(),
                            value: outcome.probability,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Parse and validate a graph from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let graph: MdpGraph = serde_json::from_str(json)?;
        graph.validate()?;
        Ok(graph)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl DecisionProcess for MdpGraph {
    fn state_names(&self) -> Vec<&StateName> {
        self.transitions.keys().collect()
    }

    fn action_names(&self, state: &StateName) -> Vec<&ActionName> {
        self.transitions
            .get(state)
            .map(|actions| actions.keys().collect())
            .unwrap_or_default()
    }

    fn outcomes(&self, state: &StateName, action: &ActionName) -> &[Outcome] {
        self.transitions
            .get(state)
            .and_then(|actions| actions.get(action))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn is_accepting(&self, state: &StateName) -> bool {
        self.accepting.contains(state)
    }
}

/// Incremental builder for [`MdpGraph`].
#[derive(Debug, Clone, Default)]
pub struct MdpGraphBuilder {
    graph: MdpGraph,
}

impl MdpGraphBuilder {
    /// Declare a state.
    pub fn state(mut self, name: impl Into<StateName>) -> Self {
        self.graph.transitions.entry(name.into()).or_default();
        self
    }

    /// Add an outcome of `action` taken in `from`, declaring `from` if needed.
    pub fn outcome(
        mut self,
        from: impl Into<StateName>,
        action: impl Into<ActionName>,
        to: impl Into<StateName>,
        probability: f64,
        reward: f64,
    ) -> Self {
        self.graph
            .transitions
            .entry(from.into())
            .or_default()
            .entry(action.into())
            .or_default()
            .push(Outcome {
                next: to.into(),
                probability,
                reward,
            });
        self
    }

    /// Mark a state accepting, declaring it if needed.
    pub fn accepting(mut self, name: impl Into<StateName>) -> Self {
        let name = name.into();
        self.graph.transitions.entry(name.clone()).or_default();
        self.graph.accepting.insert(name);
        self
    }

    pub fn initial(mut self, name: impl Into<StateName>) -> Self {
        self.graph.initial = Some(name.into());
        self
    }

    /// Finish the graph after [`MdpGraph::validate`].
    pub fn build(self) -> Result<MdpGraph> {
        self.graph.validate()?;
        Ok(self.graph)
    }

    /// Finish the graph without validation, for sources that are already
    /// consistent by construction.
    pub fn build_unchecked(self) -> MdpGraph {
        self.graph
    }
}
