//! The error type shared by all fallible simulation operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    /// A network needs at least an input and an output layer, none of them empty.
    #[error("invalid network topology: {0}")]
    InvalidTopology(String),
    /// The amount of values fed into a network does not match its input layer.
    #[error("network expects {expected} inputs but got {actual}")]
    InputMismatch { expected: usize, actual: usize },
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("brain storage failed: {0}")]
    Storage(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Shortcut used throughout the crate.
pub type SimResult<T> = Result<T, SimulationError>;
