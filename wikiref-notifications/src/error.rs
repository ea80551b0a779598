//! Error types for notification retrieval

use thiserror::Error;

/// A filter expression could not be turned into a query condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryTranslationError {
    #[error("Unsupported node: {0}")]
    UnsupportedNode(String),
}

/// Failure reported by an event store.
#[derive(Debug, Error)]
pub enum EventSourceError {
    #[error("Event store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Failure of the notification pipeline. Always carries the lower-level cause.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct NotificationError {
    message: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl NotificationError {
    pub const RETRIEVAL_FAILED: &'static str = "Fail to get the list of notifications.";

    pub fn new(message: impl Into<String>, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn retrieval(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::new(Self::RETRIEVAL_FAILED, source)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

/// Result type using NotificationError
pub type Result<T> = std::result::Result<T, NotificationError>;
