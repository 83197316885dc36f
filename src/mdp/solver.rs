//! Value iteration with synchronous Bellman-optimality sweeps
//!
//! Every sweep computes
//!
//! ```text
//! Q(s, a) = Σ p · (r + γ · V(s'))      over the outcomes of a in s
//! V'(s)   = max_a Q(s, a)
//! ```
//!
//! from the values of the previous sweep only, so the result does not depend
//! on the order states are visited in. Accepting states and states without
//! actions are terminal: they start and stay at zero whatever the initial
//! values, so the seed never moves the fixed point.

use std::collections::{BTreeMap, HashMap};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{DecisionProcess, QTable};
use crate::{
    Error, Result,
    identifiers::{ActionName, StateName},
    ports::Observer,
};

/// Starting values of the non-terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum InitialValues {
    /// Every state starts at zero.
    #[default]
    Zero,
    /// Values drawn uniformly from `[low, high]` with a seeded generator.
    Uniform { seed: u64, low: f64, high: f64 },
}

/// Configuration for [`ValueIteration`].
///
/// # Examples
///
/// ```
/// use campfire::mdp::{InitialValues, SolverConfig};
///
/// let config = SolverConfig::new(0.5, 0.01)
///     .with_max_sweeps(500)
///     .with_initial_values(InitialValues::Uniform { seed: 7, low: 0.0, high: 100.0 });
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Discount factor γ in (0, 1]
    pub discount: f64,
    /// Convergence threshold θ on the largest value change of a sweep
    pub threshold: f64,
    /// Upper bound on the number of sweeps
    #[serde(default = "default_max_sweeps")]
    pub max_sweeps: usize,
    #[serde(default)]
    pub initial_values: InitialValues,
}

fn default_max_sweeps() -> usize {
    10_000
}

impl SolverConfig {
    pub fn new(discount: f64, threshold: f64) -> Self {
        Self {
            discount,
            threshold,
            max_sweeps: default_max_sweeps(),
            initial_values: InitialValues::Zero,
        }
    }

    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    pub fn with_initial_values(mut self, initial_values: InitialValues) -> Self {
        self.initial_values = initial_values;
        self
    }

    /// Set uniformly drawn initial values with a fixed seed.
    pub fn with_seed(self, seed: u64, low: f64, high: f64) -> Self {
        self.with_initial_values(InitialValues::Uniform { seed, low, high })
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSolverParameter`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &str, value: f64| Error::InvalidSolverParameter {
            name: name.to_string(),
            value,
        };
        if !(self.discount > 0.0 && self.discount <= 1.0) {
            return Err(invalid("discount", self.discount));
        }
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(invalid("threshold", self.threshold));
        }
        if self.max_sweeps == 0 {
            return Err(invalid("max_sweeps", 0.0));
        }
        if let InitialValues::Uniform { low, high, .. } = self.initial_values {
            if !low.is_finite() {
                return Err(invalid("initial_values.low", low));
            }
            if !(high.is_finite() && high >= low) {
                return Err(invalid("initial_values.high", high));
            }
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    /// γ = 0.5, θ = 0.01, zero initial values.
    fn default() -> Self {
        Self::new(0.5, 0.01)
    }
}

/// Converged value function with its Q-table and greedy policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub values: BTreeMap<StateName, f64>,
    pub q_table: QTable,
    pub policy: BTreeMap<StateName, ActionName>,
    /// Number of sweeps until convergence
    pub sweeps: usize,
    /// Largest value change of the last sweep
    pub final_delta: f64,
}

impl Solution {
    pub fn value_of(&self, state: &str) -> Option<f64> {
        self.values.get(state).copied()
    }

    pub fn action_for(&self, state: &str) -> Option<&ActionName> {
        self.policy.get(state)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Action with its outcomes resolved to dense state indices.
struct IndexedAction<'p> {
    name: &'p ActionName,
    /// `(next, probability, reward)`
    outcomes: Vec<(usize, f64, f64)>,
}

/// Dense view of a decision process, fixed for the duration of one solve.
struct Indexed<'p> {
    names: Vec<&'p StateName>,
    accepting: Vec<bool>,
    actions: Vec<Vec<IndexedAction<'p>>>,
}

impl<'p> Indexed<'p> {
    fn build<P: DecisionProcess + ?Sized>(process: &'p P) -> Result<Self> {
        let mut names = process.state_names();
        names.sort();
        names.dedup();
        let index: HashMap<&StateName, usize> =
            names.iter().enumerate().map(|(i, name)| (*name, i)).collect();

        let mut accepting = Vec::with_capacity(names.len());
        let mut actions = Vec::with_capacity(names.len());
        for &state in &names {
            accepting.push(process.is_accepting(state));
            let mut action_names = process.action_names(state);
            action_names.sort();
            action_names.dedup();
            let mut indexed = Vec::with_capacity(action_names.len());
            for name in action_names {
                let outcomes = process
                    .outcomes(state, name)
                    .iter()
                    .map(|outcome| {
                        index
                            .get(&outcome.next)
                            .map(|&next| (next, outcome.probability, outcome.reward))
                            .ok_or_else(|| Error::UnknownState {
                                name: outcome.next.to_string(),
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                indexed.push(IndexedAction { name, outcomes });
            }
            actions.push(indexed);
        }

        Ok(Self {
            names,
            accepting,
            actions,
        })
    }

    /// Accepting, or no action to take.
    fn is_terminal(&self, state: usize) -> bool {
        self.accepting[state] || self.actions[state].is_empty()
    }

    fn q_value(&self, action: &IndexedAction<'_>, values: &[f64], discount: f64) -> f64 {
        action
            .outcomes
            .iter()
            .map(|&(next, probability, reward)| probability * (reward + discount * values[next]))
            .sum()
    }

    /// First action by name with the highest Q-value.
    fn best(&self, state: usize, values: &[f64], discount: f64) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, action) in self.actions[state].iter().enumerate() {
            let q = self.q_value(action, values, discount);
            match best {
                Some((_, best_q)) if q <= best_q => {}
                _ => best = Some((i, q)),
            }
        }
        best
    }
}

/// Value-iteration solver
pub struct ValueIteration {
    config: SolverConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl ValueIteration {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer notified after every sweep
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Run sweeps until the largest value change drops to the threshold.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSolverParameter`] for an invalid configuration
    /// - [`Error::UnknownState`] when an outcome names an undeclared state
    /// - [`Error::Convergence`] when `max_sweeps` sweeps were not enough
    pub fn solve<P: DecisionProcess + ?Sized>(&mut self, process: &P) -> Result<Solution> {
        self.config.validate()?;
        let indexed = Indexed::build(process)?;
        let discount = self.config.discount;

        let mut values = self.initial_values(&indexed);
        let mut sweeps = 0;
        let mut delta = f64::INFINITY;
        while delta > self.config.threshold {
            if sweeps == self.config.max_sweeps {
                return Err(Error::Convergence {
                    sweeps,
                    last_delta: delta,
                });
            }
            let mut next = values.clone();
            delta = 0.0;
            for state in 0..indexed.names.len() {
                if indexed.accepting[state] {
                    continue;
                }
                if let Some((_, q)) = indexed.best(state, &values, discount) {
                    delta = delta.max((q - values[state]).abs());
                    next[state] = q;
                }
            }
            values = next;
            sweeps += 1;
            for observer in &mut self.observers {
                observer.on_sweep(sweeps, delta)?;
            }
        }

        let mut q_table = QTable::new();
        let mut policy = BTreeMap::new();
        for (state, name) in indexed.names.iter().enumerate() {
            if indexed.accepting[state] {
                continue;
            }
            for action in &indexed.actions[state] {
                let q = indexed.q_value(action, &values, discount);
                q_table.set((*name).clone(), action.name.clone(), q);
            }
            if let Some((best, _)) = indexed.best(state, &values, discount) {
                policy.insert((*name).clone(), indexed.actions[state][best].name.clone());
            }
        }

        for observer in &mut self.observers {
            observer.on_solve_end(sweeps, delta)?;
        }

        Ok(Solution {
            values: indexed
                .names
                .iter()
                .map(|name| (*name).clone())
                .zip(values)
                .collect(),
            q_table,
            policy,
            sweeps,
            final_delta: delta,
        })
    }

    fn initial_values(&self, indexed: &Indexed<'_>) -> Vec<f64> {
        match self.config.initial_values {
            InitialValues::Zero => vec![0.0; indexed.names.len()],
            InitialValues::Uniform { seed, low, high } => {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..indexed.names.len())
                    .map(|state| {
                        if indexed.is_terminal(state) {
                            0.0
                        } else {
                            rng.random_range(low..=high)
                        }
                    })
                    .collect()
            }
        }
    }
}
