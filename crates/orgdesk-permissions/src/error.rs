//! Error types for the permissions system

use thiserror::Error;

/// Result type for permissions operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the permissions system
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("System template cannot be modified: {0}")]
    ImmutableTemplate(String),

    #[error("Invalid permission level: {0}")]
    InvalidPermissionLevel(String),

    #[error("Invalid glob pattern: {0}")]
    InvalidGlobPattern(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

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

/// Errors raised by permission store implementations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A conditional write saw a different prior state than expected
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("A pending request already exists for user {user_id} and tool {tool_id}")]
    DuplicatePending { user_id: String, tool_id: String },

    #[error("Duplicate identifier: {0}")]
    DuplicateId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Whether the error reflects competing writers rather than a broken store
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::ConcurrencyConflict(_) | StoreError::DuplicatePending { .. }
        )
    }
}
