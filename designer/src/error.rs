//! Designer error types

use thiserror::Error;
use shared::ApiFailure;

/// Result type for designer operations
pub type DesignerResult<T> = Result<T, DesignerError>;

/// Designer error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignerError {
    #[error("Room index {index} out of range (room count {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("Invalid room: {reason}")]
    InvalidRoom { reason: String },

    #[error("Form incomplete, missing: {}", missing.join(", "))]
    IncompleteForm { missing: Vec<String> },

    #[error("Design generation failed: {reason}")]
    Generation { reason: ApiFailure },

    #[error("Image search failed: {reason}")]
    Search { reason: ApiFailure },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Design request superseded by a newer submission")]
    Superseded,

    #[error("No design has been generated in this session yet")]
    NoResult,
}

impl DesignerError {
    /// Collaborator failures are transient from the user's point of view
    pub fn is_retryable(&self) -> bool {
        matches!(self, DesignerError::Generation { .. } | DesignerError::Search { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            DesignerError::Generation { reason: ApiFailure::Timeout } | DesignerError::Search { reason: ApiFailure::Timeout }
        )
    }

    pub fn config(message: impl Into<String>) -> Self {
        DesignerError::Configuration { message: message.into() }
    }
}
