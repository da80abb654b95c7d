//! Error types for the queue layer

use std::fmt;
use thiserror::Error;

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Queue error types
#[derive(Error, Debug)]
pub enum QueueError {
    /// Network or storage failure talking to the queue service
    #[error("Transport error: {0}")]
    Transport(String),

    /// Queue or message does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Message was modified by another receiver (stale pop receipt)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid requeue or service configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl QueueError {
    /// Create a transport error
    pub fn transport<E: fmt::Display>(err: E) -> Self {
        Self::Transport(err.to_string())
    }

    /// Create a not found error
    pub fn not_found<E: fmt::Display>(item: E) -> Self {
        Self::NotFound(item.to_string())
    }

    /// Create a conflict error
    pub fn conflict<E: fmt::Display>(msg: E) -> Self {
        Self::Conflict(msg.to_string())
    }

    /// Create a configuration error
    pub fn configuration<E: fmt::Display>(msg: E) -> Self {
        Self::Configuration(msg.to_string())
    }

    /// Transport failures are worth another attempt on the next scheduled run
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
