//! Core error types for the push notification pipeline.
//!
//! This module defines storage- and provider-agnostic error types. Adapter
//! crates (MongoDB, Expo) convert their own errors into these types at the
//! trait boundary.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Push provider request failed: {0}")]
    Push(String),

    #[error("Change feed failed: {0}")]
    ChangeFeed(String),
}

/// Database-agnostic error type for storage operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The handle was used after `disconnect`.
    #[error("Database is not connected")]
    NotConnected,
}

/// Errors raised while interpolating document fields into a notification.
///
/// These never leave the formatter; they select the degraded message.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Field '{field}' has an unsupported value: {reason}")]
    InvalidField { field: String, reason: String },
}

impl FormatError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
