//! Error types for the Expo client.

use thiserror::Error;

/// Result type alias for Expo operations.
pub type Result<T> = std::result::Result<T, ExpoError>;

/// Errors that can occur while talking to the Expo gateway.
#[derive(Debug, Error)]
pub enum ExpoError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error response from the gateway
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid request (too many messages, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Access token cannot be used as a header value
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl ExpoError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}

impl From<ExpoError> for pushwatch_core::Error {
    fn from(err: ExpoError) -> Self {
        pushwatch_core::Error::Push(err.to_string())
    }
}
