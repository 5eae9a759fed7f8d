//! Storage-specific error types for MongoDB operations.
//!
//! Driver errors are wrapped here and converted to the database-agnostic
//! error types defined in `pushwatch_core` before leaving the crate.

use pushwatch_core::errors::{DatabaseError, Error};
use thiserror::Error;

/// Storage-specific errors that wrap MongoDB driver types.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] mongodb::error::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] mongodb::error::Error),

    #[error("Change stream failed: {0}")]
    ChangeStream(#[source] mongodb::error::Error),

    #[error("Database handle used after disconnect")]
    Disconnected,
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => {
                Error::Database(DatabaseError::ConnectionFailed(e.to_string()))
            }
            StorageError::QueryFailed(e) => {
                Error::Database(DatabaseError::QueryFailed(e.to_string()))
            }
            StorageError::ChangeStream(e) => Error::ChangeFeed(e.to_string()),
            StorageError::Disconnected => Error::Database(DatabaseError::NotConnected),
        }
    }
}

/// Extension trait for converting driver results to core results.
///
/// `From<mongodb::error::Error> for pushwatch_core::Error` would break the
/// orphan rule, so conversions go through `StorageError`.
pub trait IntoCore<T> {
    fn into_core(self) -> pushwatch_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, mongodb::error::Error> {
    fn into_core(self) -> pushwatch_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}
