//! Shared error types for the home design assistant

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Invalid session id: {input}")]
    InvalidSessionId { input: String },
}

impl SharedError {
    pub fn invalid_value(field: &str, value: &str) -> Self {
        SharedError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
