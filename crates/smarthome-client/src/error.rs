//! Error types for SmartHome client operations

use thiserror::Error;

use crate::streaming::StreamError;

/// Result type alias for SmartHome client operations
pub type Result<T> = std::result::Result<T, SmartHomeError>;

/// Errors that can occur during SmartHome client operations
#[derive(Error, Debug)]
pub enum SmartHomeError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Server returned an error response
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Credentials missing or rejected (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials accepted but access denied (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Device not found
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Timeout
    #[error("Request timed out")]
    Timeout,

    /// Streaming error
    #[error("Stream error: {0}")]
    StreamError(#[from] StreamError),
}

impl SmartHomeError {
    /// Create a server error from status code and message
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code carried by this error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::DeviceNotFound(_) => Some(404),
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            Self::StreamError(StreamError::Server { status, .. }) => Some(*status),
            _ => None,
        }
    }
}
