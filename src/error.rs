// Error types for the task store

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures surfaced by [`TaskStore`](crate::TaskStore) operations
///
/// `NotFound` is kept apart from `Sqlite` so callers can tell a missing
/// record from an engine fault without inspecting messages.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No task row with the given id
    #[error("task not found: {0}")]
    NotFound(i64),

    /// Task rejected before reaching the database
    #[error("invalid task: {0}")]
    InvalidTask(String),

    /// Id string that does not parse as an integer key
    #[error("invalid task id: {0:?}")]
    InvalidId(String),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// True when the error means the record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
