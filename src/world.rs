//! Grid world: states, rules and the exhaustive transition generator

pub mod catalog;
pub mod generator;
pub mod geometry;
pub mod graph;
pub mod state;

pub use catalog::{FinalDeliveryGate, ResourceCell, RuleCatalog, costs};
pub use generator::{Generator, generate};
pub use geometry::{best_direction, legal_directions, rank_directions};
pub use graph::{Edge, FailureReason, GraphStats, StateGraph, StateTable, Transition};
pub use state::{DeliveryCounts, DeliveryTargets, State};
