//! Error types for repobot.

use thiserror::Error;

/// Main error type for repobot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(String),

    /// Remote API answered with an unexpected status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response payload did not have the expected shape
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Text embedded in a reply when an operation fails.
    ///
    /// API errors surface the remote host's own message; everything else
    /// uses the display form.
    pub fn detail(&self) -> String {
        match self {
            Error::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for repobot operations.
pub type Result<T> = std::result::Result<T, Error>;
