//! Domain-specific error types for memo-board

use thiserror::Error;

/// Main error type for the memo-board library
#[derive(Error, Debug)]
pub enum MemoBoardError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Advisor provider error: {message}")]
    Provider { message: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Feature disabled: {message}")]
    FeatureDisabled { message: String },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },
}

impl MemoBoardError {
    /// Advisor failures are surfaced to the user but never block local data.
    pub fn is_advisor_failure(&self) -> bool {
        matches!(
            self,
            MemoBoardError::Provider { .. }
                | MemoBoardError::Timeout { .. }
                | MemoBoardError::FeatureDisabled { .. }
        )
    }
}

impl From<anyhow::Error> for MemoBoardError {
    fn from(err: anyhow::Error) -> Self {
        MemoBoardError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MemoBoardError {
    fn from(err: serde_json::Error) -> Self {
        MemoBoardError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for MemoBoardError {
    fn from(err: std::io::Error) -> Self {
        MemoBoardError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for MemoBoardError {
    fn from(err: chrono::ParseError) -> Self {
        MemoBoardError::Validation {
            message: format!("Date parsing error: {}", err),
        }
    }
}

/// Result type alias for memo-board operations
pub type Result<T> = std::result::Result<T, MemoBoardError>;
