//! Error types for logging operations.

use std::io;

/// Result type for logging operations.
pub type Result<T> = std::result::Result<T, LoggingError>;

/// Errors that can occur while setting up a logger.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// I/O error from file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Writer thread could not be started.
    #[error("Logging error: {0}")]
    Logging(String),
}
