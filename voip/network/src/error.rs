//! Network error types

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NetworkError>;

/// Network-related errors
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Malformed or unsupported RTP data
    #[error("RTP error: {0}")]
    Rtp(String),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Network error: {0}")]
    Network(#[from] io::Error),

    #[error("Socket closed")]
    Closed,
}
