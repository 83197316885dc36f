//! Probabilistic state-space generation and MDP solving for a grid-world agent
//!
//! This crate provides:
//! - A rule catalog and immutable world states for a resource-gathering agent
//! - An exhaustive generator producing a probability- and reward-labelled
//!   transition graph with accepting and failing terminal states
//! - A value-iteration solver over any named-state decision process
//! - Observers, DOT and CSV export, and a command-line front end

pub mod adapters;
pub mod cli;
pub mod error;
pub mod export;
pub mod identifiers;
pub mod mdp;
pub mod ports;
pub mod scenarios;
pub mod types;
pub mod world;

pub use error::{Error, Result};
pub use identifiers::{ActionName, StateId, StateName};
pub use mdp::{DecisionProcess, MdpGraph, Solution, SolverConfig, ValueIteration};
pub use types::{Coord, Direction, Item};
pub use world::{Generator, RuleCatalog, State, StateGraph, generate};
