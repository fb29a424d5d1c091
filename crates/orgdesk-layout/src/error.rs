//! Error types for department layout and customization

use thiserror::Error;

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in layout operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Stored state changed between a read and the write based on it
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a not found error
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<orgdesk_permissions::Error> for Error {
    fn from(err: orgdesk_permissions::Error) -> Self {
        match err {
            orgdesk_permissions::Error::Unauthorized(message) => Error::Unauthorized(message),
            orgdesk_permissions::Error::Validation(message) => Error::Validation(message),
            other => Error::Internal(other.to_string()),
        }
    }
}
