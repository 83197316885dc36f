//! Adapters implementing the observer port.
//!
//! The generator and the solver only know [`crate::ports::Observer`]; these
//! are the concrete progress, trace and statistics implementations.

pub mod progress;
pub mod stats;
pub mod trace;

pub use progress::ProgressObserver;
pub use stats::{EventCounts, StatsObserver};
pub use trace::TraceObserver;
