//! Error types for the campfire crate

use thiserror::Error;

/// Main error type for the campfire crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("coordinate ({x}, {y}) for {what} lies outside the {width}x{height} board")]
    OutOfBoard {
        what: String,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error(
        "outgoing probabilities of state {state} sum to {total} (expected 1 within {tolerance})"
    )]
    ProbabilityInvariant {
        state: String,
        total: f64,
        tolerance: f64,
    },

    #[error("state space exceeded the limit of {limit} states")]
    StateLimitExceeded { limit: usize },

    #[error("value iteration did not converge after {sweeps} sweeps (last delta {last_delta})")]
    Convergence { sweeps: usize, last_delta: f64 },

    #[error("invalid solver parameter {name} = {value}")]
    InvalidSolverParameter { name: String, value: f64 },

    #[error("unknown state '{name}' referenced by the decision graph")]
    UnknownState { name: String },

    #[error("probability {value} on edge {from} --[{action}]--> {to} is outside [0, 1]")]
    InvalidProbability {
        from: String,
        to: String,
        action: String,
        value: f64,
    },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    /// Shorthand for [`Error::InvalidConfiguration`].
    pub fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}
