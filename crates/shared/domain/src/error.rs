//! Domain-level errors.
//!
//! These errors represent invalid entities and record decoding failures.
//! They are independent of the store client.

use thiserror::Error;

/// Domain-specific errors for rule violations and codec failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A stored record lacks a required field
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A stored field could not be parsed
    #[error("Invalid value '{value}' for field {field}")]
    InvalidField { field: String, value: String },
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        DomainError::MissingField(field.into())
    }

    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>, value: impl Into<String>) -> Self {
        DomainError::InvalidField {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether this error came from decoding a stored record
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            DomainError::MissingField(_) | DomainError::InvalidField { .. }
        )
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
