//! Error types for TURN operations.

use std::io;

pub type Result<T> = std::result::Result<T, TurnError>;

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("IO error: {0}")]
    Io(io::Error),
    #[error("STUN error: {0}")]
    Stun(#[from] stun::StunError),
    #[error("Allocation failed: {0}")]
    AllocationFailed(String),
    #[error("Refresh failed: {0}")]
    RefreshFailed(String),
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("No allocation exists")]
    NoAllocation,
    #[error("Server error {0}: {1}")]
    ServerError(u16, String),
    #[error("Allocation quota reached on TURN server")]
    AllocationQuotaReached,
    #[error("TURN server has insufficient capacity")]
    InsufficientCapacity,
    #[error("Unsupported transport protocol")]
    UnsupportedTransport,
    #[error("Timeout waiting for response")]
    Timeout,
    #[error("Attribute error: {0}")]
    AttributeError(String),
}

impl TurnError {
    /// Maps an ERROR-CODE that the client cannot recover from.
    pub fn from_error_code(code: u16, reason: String) -> Self {
        match code {
            401 => TurnError::AuthenticationFailed(reason),
            442 => TurnError::UnsupportedTransport,
            486 => TurnError::AllocationQuotaReached,
            508 => TurnError::InsufficientCapacity,
            _ => TurnError::ServerError(code, reason),
        }
    }
}

impl From<io::Error> for TurnError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TurnError::Timeout,
            _ => TurnError::Io(err),
        }
    }
}
