//! Error types for repeatcal operations.

use thiserror::Error;

/// Errors surfaced by the store and by event operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalError {
    #[error("Failed to fetch events: {0}")]
    FetchFailed(String),

    #[error("Failed to save event: {0}")]
    SaveFailed(String),

    #[error("Failed to delete event: {0}")]
    DeleteFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalError {
    /// Collapse any failure inside a save transaction into `SaveFailed`,
    /// keeping the kinds the caller needs to tell apart.
    pub fn into_save_failure(self) -> Self {
        match self {
            CalError::NotFound(_) | CalError::InvalidEvent(_) | CalError::SaveFailed(_) => self,
            other => CalError::SaveFailed(other.to_string()),
        }
    }

    /// Collapse any failure inside a delete into `DeleteFailed`.
    pub fn into_delete_failure(self) -> Self {
        match self {
            CalError::NotFound(_) | CalError::DeleteFailed(_) => self,
            other => CalError::DeleteFailed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CalError {
    fn from(err: serde_json::Error) -> Self {
        CalError::Serialization(err.to_string())
    }
}

/// Result type alias for repeatcal operations.
pub type CalResult<T> = Result<T, CalError>;
