//! Export of generated graphs and solver results
//!
//! - [`dot`] renders a [`crate::world::StateGraph`] in Graphviz DOT syntax
//! - [`policy_csv`] writes value functions, policies and Q-tables as CSV
//!
//! Solutions serialize to JSON directly through
//! [`crate::mdp::Solution::to_json_string`].

pub mod dot;
pub mod policy_csv;

pub use policy_csv::{PolicyRecord, QValueRecord};
