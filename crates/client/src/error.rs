//! Error types for the vRA client

use thiserror::Error;

/// Result type alias using the vRA client error
pub type Result<T> = std::result::Result<T, Error>;

/// vRA client error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("vRA API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Resource not found: {path}")]
    NotFound { path: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Request {id} failed: {message}")]
    RequestFailed { id: String, message: String },

    #[error("Operation timeout after {seconds}s: {operation}")]
    Timeout { operation: String, seconds: u64 },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Whether the error means the remote object does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Api { status, .. } => *status == 404,
            _ => false,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::InvalidConfig(format!("invalid url: {}", e))
    }
}
