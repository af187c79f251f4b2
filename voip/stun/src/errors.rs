//! STUN error types

/// Errors that can occur during STUN operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StunError {
    #[error("Invalid message type: 0x{0:04X}")]
    InvalidMessageType(u16),
    #[error("Invalid magic cookie")]
    InvalidMagicCookie,
    #[error("Invalid attribute format")]
    InvalidAttributeFormat,
    #[error("Invalid address family: 0x{0:02X}")]
    InvalidAddressFamily(u8),
    #[error("Message too short")]
    MessageTooShort,
    #[error("Attribute too short")]
    AttributeTooShort,
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),
    #[error("Missing attribute: {0}")]
    MissingAttribute(&'static str),
    #[error("Error response {code}: {reason}")]
    ErrorResponse { code: u16, reason: String },
    #[error("MESSAGE-INTEGRITY check failed")]
    IntegrityMismatch,
    #[error("Unexpected message type: 0x{0:04X}")]
    UnexpectedMessageType(u16),
    #[error("Socket error: {0}")]
    SocketError(String),
    #[error("Timeout waiting for response")]
    Timeout,
}

impl From<std::io::Error> for StunError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => StunError::Timeout,
            _ => StunError::SocketError(err.to_string()),
        }
    }
}
