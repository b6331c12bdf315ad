//! Error types for vectorlink.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! remote index service, embedding provider and serialization failures.

use thiserror::Error;

/// HTTP status the index service answers with when an index already exists.
pub const CONFLICT_STATUS: u16 = 409;

/// Unified error type for vectorlink.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic: errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by (or while talking to) the remote index service
    #[error("Remote service error{}: {message}", status_suffix(.status))]
    Remote {
        /// HTTP status, when the service answered at all
        status: Option<u16>,
        message: String,
    },

    /// Index creation raced with an existing index of the same name
    #[error("Index '{0}' already exists")]
    IndexConflict(String),

    /// Upsert or query attempted before the index handle was set up
    #[error("Vector index not initialized; call ensure_index_ready first")]
    NotInitialized,

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" ({})", code),
        None => String::new(),
    }
}

impl AppError {
    /// Build a remote error from an HTTP status and response body.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        AppError::Remote {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Build a remote error for failures that never produced a response.
    pub fn transport(message: impl Into<String>) -> Self {
        AppError::Remote {
            status: None,
            message: message.into(),
        }
    }

    /// Whether this error means "the index already exists".
    pub fn is_conflict(&self) -> bool {
        match self {
            AppError::IndexConflict(_) => true,
            AppError::Remote { status, .. } => *status == Some(CONFLICT_STATUS),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_detection() {
        assert!(AppError::IndexConflict("docs".to_string()).is_conflict());
        assert!(AppError::remote(409, "already exists").is_conflict());
        assert!(!AppError::remote(500, "boom").is_conflict());
        assert!(!AppError::transport("connection refused").is_conflict());
        assert!(!AppError::NotInitialized.is_conflict());
    }

    #[test]
    fn test_remote_display() {
        let err = AppError::remote(404, "index not found");
        assert_eq!(
            err.to_string(),
            "Remote service error (404): index not found"
        );

        let err = AppError::transport("timed out");
        assert_eq!(err.to_string(), "Remote service error: timed out");
    }
}
