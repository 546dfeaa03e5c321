use thiserror::Error;

/// Result type for beacon_dqn operations
pub type Result<T> = std::result::Result<T, DqnError>;

/// Main error type for the agent core
#[derive(Debug, Error)]
pub enum DqnError {
    /// Invalid configuration or constructor argument
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Sampling was requested before the replay buffer was warm
    #[error("Insufficient data: requested {requested} transitions, buffer holds {available}")]
    InsufficientData {
        requested: usize,
        available: usize,
    },

    /// Shapes of stored transitions and estimator disagree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// A TD step was invoked with zero transitions
    #[error("Empty batch: the TD update needs at least one transition")]
    EmptyBatch,

    /// Numerical computation errors
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for DqnError {
    fn from(err: bincode::Error) -> Self {
        DqnError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DqnError {
    fn from(err: serde_json::Error) -> Self {
        DqnError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl DqnError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DqnError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Only a cold replay buffer is recoverable within a training run: the
    /// caller skips the optimizer step and keeps collecting experience.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DqnError::InsufficientData { .. })
    }
}
