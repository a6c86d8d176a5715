//! Error types for the pose filtering library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File or stream I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Filter parameters outside their valid range
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Persisted configuration could not be parsed or failed validation
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Malformed pose sample
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
