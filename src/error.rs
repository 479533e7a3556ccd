// Error types for task store operations

use crate::task::TaskId;
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Errors surfaced by the store and its backings
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input rejected before any mutation took place
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The referenced task no longer exists
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The backing could not be opened or initialised
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn empty_title() -> Self {
        Self::validation("title", "title cannot be empty")
    }

    pub fn invalid_due_date(raw: &str) -> Self {
        Self::validation("due_date", format!("'{}' is not a valid date (expected YYYY-MM-DD)", raw))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
