use std::fmt;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Main error type for the agent subsystem
#[derive(Debug, Clone)]
pub enum AgentError {
    /// Invalid dimensions for operations
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Numerical computation errors
    NumericalError(String),

    /// A training step is already in flight
    TrainingInProgress,

    /// The policy engine has been disposed
    EngineDisposed,
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            AgentError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            AgentError::TrainingInProgress => write!(f, "A training step is already in flight"),
            AgentError::EngineDisposed => write!(f, "Policy engine has been disposed"),
        }
    }
}

impl std::error::Error for AgentError {}

// Helper functions for common error patterns
impl AgentError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        AgentError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
