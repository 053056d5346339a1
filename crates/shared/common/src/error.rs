//! Unified error handling for the user store.
//!
//! Provides a single error type covering store failures, uniqueness
//! conflicts, missing records and record decoding problems.

use domain::DomainError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Resource errors
    #[error("{0} already exists")]
    Duplicate(String),

    #[error("{0} does not exist")]
    NotFound(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Decode error: {0}")]
    Decode(String),

    // Store errors
    #[error("Store error: {0}")]
    Store(String),

    #[cfg(feature = "cache")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get a stable error code for callers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Duplicate(_) => "DUPLICATE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Decode(_) => "DECODE_ERROR",
            AppError::Store(_) => "STORE_ERROR",
            #[cfg(feature = "cache")]
            AppError::Redis(_) => "STORE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure came from the underlying store
    pub fn is_store_error(&self) -> bool {
        match self {
            AppError::Store(_) => true,
            #[cfg(feature = "cache")]
            AppError::Redis(_) => true,
            _ => false,
        }
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            e @ (DomainError::MissingField(_) | DomainError::InvalidField { .. }) => {
                AppError::Decode(e.to_string())
            }
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn duplicate(what: impl Into<String>) -> Self {
        AppError::Duplicate(what.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        AppError::Store(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
