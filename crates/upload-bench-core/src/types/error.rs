//! Error types and handling for the upload benchmark
//!
//! A single error enum is shared by the server, the client driver and the
//! reporting tools.

use thiserror::Error;

/// Main result type used throughout the workspace
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the upload benchmark
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP transport or protocol errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Plot rendering errors
    #[error("Plot error: {0}")]
    Plot(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a plot error
    pub fn plot(msg: impl Into<String>) -> Self {
        Self::Plot(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
