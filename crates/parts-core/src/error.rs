//! # Error Types
//!
//! Typed error handling for the parts store.
//! Every store, payment and access-control operation returns `Result<T, PartsError>`.

use thiserror::Error;

/// Core error type shared by all crates in the workspace
#[derive(Debug, Error)]
pub enum PartsError {
    /// Missing or malformed credential
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Credential rejected or role insufficient
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request data the server refuses to act on
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Duplicate document identifier
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Document store rejected the operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PartsError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PartsError::Unauthenticated(_) => 401,
            PartsError::Forbidden(_) => 403,
            PartsError::InvalidRequest(_) => 400,
            PartsError::Conflict(_) => 409,
            PartsError::Configuration(_) => 500,
            PartsError::Storage(_) => 500,
            PartsError::ProviderError { .. } => 502,
            PartsError::NetworkError(_) => 503,
            PartsError::Serialization(_) => 500,
            PartsError::Internal(_) => 500,
        }
    }

    /// True for failures of a downstream collaborator (store or payment provider).
    /// Their details are logged, never echoed to the caller.
    pub fn is_upstream(&self) -> bool {
        self.status_code() >= 500
    }
}

/// Result type alias for parts store operations
pub type PartsResult<T> = Result<T, PartsError>;
