//! Error types for the HEVC core

use thiserror::Error;

/// Result type alias for HEVC core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the HEVC core
#[derive(Error, Debug)]
pub enum Error {
    /// Plane allocation failed
    #[error("Failed to allocate {plane} plane of {samples} samples")]
    Alloc { plane: &'static str, samples: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Unsupported feature
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create an unsupported error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Error::InvalidState(msg.into())
    }
}
