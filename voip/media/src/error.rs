//! Error types for media operations.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MediaError>;

/// Error type for media operations
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Audio device or stream error
    #[error("Audio error: {0}")]
    Audio(String),

    /// Codec creation, encode or decode failure
    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("Unsupported payload type: {0}")]
    UnsupportedPayloadType(u8),

    /// The other end of an audio stream is gone
    #[error("Audio stream closed")]
    StreamClosed,
}
