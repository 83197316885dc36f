//! Ports (trait boundaries) between the core and its observers.
//!
//! The generator and the solver own these traits; progress reporting, traces
//! and statistics are adapters in [`crate::adapters`].

pub mod observer;

pub use observer::Observer;
