//! Domain errors for the focusflow session system.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur in the focusflow system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Event {event} is not allowed in state {state}")]
    InvalidTransition { state: String, event: String },

    #[error("An active session already exists: {0}")]
    ActiveSessionExists(Uuid),

    #[error("Session already completed: {0}")]
    AlreadyCompleted(Uuid),

    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Could not acquire the user lock in time; retry the operation")]
    Busy,

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
