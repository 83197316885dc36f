//! Markov decision processes over named states and their value-iteration solver
//!
//! The solver only sees the [`DecisionProcess`] shape, so it accepts hand-built
//! graphs such as the study/party example as well as generated state spaces
//! projected with [`crate::world::StateGraph::to_mdp`].
//!
//! ## Usage Example
//!
//! ```
//! use campfire::mdp::{MdpGraph, SolverConfig, ValueIteration};
//!
//! let graph = MdpGraph::builder()
//!     .state("Idle")
//!     .state("Done")
//!     .outcome("Idle", "work", "Done", 1.0, 3.0)
//!     .accepting("Done")
//!     .initial("Idle")
//!     .build()
//!     .unwrap();
//!
//! let solution = ValueIteration::new(SolverConfig::default()).solve(&graph).unwrap();
//! assert_eq!(solution.value_of("Idle"), Some(3.0));
//! assert_eq!(solution.action_for("Idle").map(|a| a.as_str()), Some("work"));
//! ```

pub mod graph;
pub mod q_table;
pub mod solver;

pub use graph::{DecisionProcess, MdpGraph, MdpGraphBuilder, Outcome};
pub use q_table::QTable;
pub use solver::{InitialValues, Solution, SolverConfig, ValueIteration};
