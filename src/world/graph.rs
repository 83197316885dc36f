//! Transition graph produced by the generator
//!
//! States are interned once in a [`StateTable`] and referenced by [`StateId`]
//! everywhere else, which keeps large state spaces compact.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    hash::{DefaultHasher, Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use super::state::State;
use crate::{
    Error, Result,
    identifiers::{ActionName, StateId, StateName},
    mdp::MdpGraph,
    types::{ActionKind, Delivery, Direction, Pace},
};

/// Labelled transition between two states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: ActionKind,
    pub direction: Option<Direction>,
    pub pace: Pace,
    /// Resource picked up or delivered
    pub item: Option<Delivery>,
    pub probability: f64,
    pub feedback: f64,
}

impl Transition {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            direction: None,
            pace: Pace::Normal,
            item: None,
            probability: 0.0,
            feedback: 0.0,
        }
    }

    pub fn movement(direction: Direction, pace: Pace) -> Self {
        let kind = match pace {
            Pace::Normal => ActionKind::Move,
            Pace::Fast => ActionKind::FastMove,
        };
        Self {
            direction: Some(direction),
            pace,
            ..Self::new(kind)
        }
    }

    pub fn with_item(mut self, item: impl Into<Delivery>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// Stable action name, e.g. `load-log`, `unload-fuel`, `fast-move-west`.
    pub fn action_name(&self) -> ActionName {
        let mut name = self.kind.as_str().to_string();
        if let Some(item) = self.item {
            name.push('-');
            name.push_str(item.as_str());
        }
        if let Some(direction) = self.direction {
            name.push('-');
            name.push_str(direction.as_str());
        }
        ActionName::new(name)
    }

    pub fn is_fast(&self) -> bool {
        self.pace == Pace::Fast
    }
}

/// Outgoing edge of a state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub target: StateId,
    pub transition: Transition,
}

/// Why a state was classified as failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    OutOfTime,
    Starved,
    NoAffordableAction,
}

#[derive(Debug, Clone)]
enum Bucket {
    One(StateId),
    Many(Vec<StateId>),
}

/// Intern table mapping states to dense identifiers and back.
///
/// States are stored once; lookups go through a 64-bit structural hash and
/// are confirmed by full equality.
#[derive(Debug, Clone, Default)]
pub struct StateTable {
    states: Vec<State>,
    buckets: HashMap<u64, Bucket>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn fingerprint(state: &State) -> u64 {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        hasher.finish()
    }

    /// Identifier of `state`, if it has been interned.
    pub fn get(&self, state: &State) -> Option<StateId> {
        self.find(Self::fingerprint(state), state)
    }

    fn find(&self, fingerprint: u64, state: &State) -> Option<StateId> {
        match self.buckets.get(&fingerprint)? {
            Bucket::One(id) => (self.states[id.index()] == *state).then_some(*id),
            Bucket::Many(ids) => ids
                .iter()
                .copied()
                .find(|id| self.states[id.index()] == *state),
        }
    }

    /// Intern `state`, returning its identifier and whether it was new.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateLimitExceeded`] once [`StateId::CAPACITY`] states
    /// are stored.
    pub fn intern(&mut self, state: State) -> Result<(StateId, bool)> {
        let fingerprint = Self::fingerprint(&state);
        if let Some(id) = self.find(fingerprint, &state) {
            return Ok((id, false));
        }
        let id = StateId::try_from_index(self.states.len()).ok_or(Error::StateLimitExceeded {
            limit: StateId::CAPACITY,
        })?;
        match self.buckets.get_mut(&fingerprint) {
            None => {
                self.buckets.insert(fingerprint, Bucket::One(id));
            }
            Some(bucket) => {
                let single = match bucket {
                    Bucket::One(existing) => Some(*existing),
                    Bucket::Many(ids) => {
                        ids.push(id);
                        None
                    }
                };
                if let Some(existing) = single {
                    *bucket = Bucket::Many(vec![existing, id]);
                }
            }
        }
        self.states.push(state);
        Ok((id, true))
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (StateId::from_index(i), s))
    }
}

/// Summary counts of a generated graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_states: usize,
    pub accepting_states: usize,
    pub failing_states: usize,
    pub transitions: usize,
}

impl GraphStats {
    fn ratio(&self, count: usize) -> f64 {
        if self.total_states == 0 {
            0.0
        } else {
            count as f64 / self.total_states as f64
        }
    }

    pub fn winning_ratio(&self) -> f64 {
        self.ratio(self.accepting_states)
    }

    pub fn losing_ratio(&self) -> f64 {
        self.ratio(self.failing_states)
    }

    pub fn final_ratio(&self) -> f64 {
        self.ratio(self.accepting_states + self.failing_states)
    }
}

/// The reachable state space with probability-weighted, reward-labelled edges.
#[derive(Debug, Clone)]
pub struct StateGraph {
    table: StateTable,
    edges: Vec<Vec<Edge>>,
    accepting: BTreeSet<StateId>,
    failing: BTreeSet<StateId>,
    failure_reasons: HashMap<StateId, FailureReason>,
    initial: StateId,
}

impl StateGraph {
    pub(crate) fn new(table: StateTable, initial: StateId) -> Self {
        let edges = vec![Vec::new(); table.len()];
        Self {
            table,
            edges,
            accepting: BTreeSet::new(),
            failing: BTreeSet::new(),
            failure_reasons: HashMap::new(),
            initial,
        }
    }

    pub(crate) fn table_mut(&mut self) -> &mut StateTable {
        &mut self.table
    }

    pub(crate) fn set_edges(&mut self, source: StateId, edges: Vec<Edge>) {
        if self.edges.len() < self.table.len() {
            self.edges.resize_with(self.table.len(), Vec::new);
        }
        self.edges[source.index()] = edges;
    }

    pub(crate) fn mark_accepting(&mut self, id: StateId) {
        self.accepting.insert(id);
    }

    pub(crate) fn mark_failing(&mut self, id: StateId, reason: FailureReason) {
        self.failing.insert(id);
        self.failure_reasons.insert(id, reason);
    }

    pub(crate) fn finish(&mut self) {
        self.edges.resize_with(self.table.len(), Vec::new);
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn state(&self, id: StateId) -> &State {
        self.table.state(id)
    }

    /// Identifier of a structurally equal state, if it was reached.
    pub fn find(&self, state: &State) -> Option<StateId> {
        self.table.get(state)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.table.iter()
    }

    pub fn edges(&self, id: StateId) -> &[Edge] {
        self.edges.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Outgoing transitions in enumeration order.
    pub fn transitions_from(&self, id: StateId) -> impl Iterator<Item = &Transition> {
        self.edges(id).iter().map(|edge| &edge.transition)
    }

    /// Outgoing transitions grouped by destination.
    pub fn successors(&self, id: StateId) -> BTreeMap<StateId, Vec<Transition>> {
        let mut grouped: BTreeMap<StateId, Vec<Transition>> = BTreeMap::new();
        for edge in self.edges(id) {
            grouped.entry(edge.target).or_default().push(edge.transition);
        }
        grouped
    }

    /// Transitions from `source` to `target`.
    pub fn transitions_between(
        &self,
        source: StateId,
        target: StateId,
    ) -> impl Iterator<Item = &Transition> {
        self.edges(source)
            .iter()
            .filter(move |edge| edge.target == target)
            .map(|edge| &edge.transition)
    }

    /// Sum of the outgoing transition probabilities of `id`.
    pub fn outgoing_probability(&self, id: StateId) -> f64 {
        self.edges(id).iter().map(|e| e.transition.probability).sum()
    }

    pub fn accepting_states(&self) -> &BTreeSet<StateId> {
        &self.accepting
    }

    pub fn failing_states(&self) -> &BTreeSet<StateId> {
        &self.failing
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.accepting.contains(&id)
    }

    pub fn is_failing(&self, id: StateId) -> bool {
        self.failing.contains(&id)
    }

    pub fn is_terminal(&self, id: StateId) -> bool {
        self.is_accepting(id) || self.is_failing(id)
    }

    pub fn failure_reason(&self, id: StateId) -> Option<FailureReason> {
        self.failure_reasons.get(&id).copied()
    }

    pub fn transition_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_states: self.len(),
            accepting_states: self.accepting.len(),
            failing_states: self.failing.len(),
            transitions: self.transition_count(),
        }
    }

    /// Project the graph onto named states and actions for the solver.
    ///
    /// State names are the [`StateId`] labels (`s0`, `s1`, ...); action names
    /// come from [`Transition::action_name`].
    pub fn to_mdp(&self) -> MdpGraph {
        let mut builder = MdpGraph::builder();
        for (id, _) in self.states() {
            builder = builder.state(StateName::from(id));
        }
        for (id, _) in self.states() {
            let source = StateName::from(id);
            for edge in self.edges(id) {
                builder = builder.outcome(
                    source.clone(),
                    edge.transition.action_name(),
                    StateName::from(edge.target),
                    edge.transition.probability,
                    edge.transition.feedback,
                );
            }
        }
        for id in &self.accepting {
            builder = builder.accepting(StateName::from(*id));
        }
        builder.initial(StateName::from(self.initial)).build_unchecked()
    }
}
