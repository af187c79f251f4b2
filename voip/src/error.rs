//! Error types for transport resolution and media legs

use config_loader::ConfigError;
use logging::LoggingError;
use media::MediaError;
use network::NetworkError;
use sdp::SdpError;
use stun::StunError;
use thiserror::Error;
use turn::TurnError;

pub type Result<T> = std::result::Result<T, VoipError>;

/// Why the TURN fallback produced no relay address.
#[derive(Debug, Error)]
pub enum TurnFallbackError {
    #[error("no TURN server configured")]
    NotConfigured,

    #[error("cannot resolve TURN server {0}")]
    InvalidServer(String),

    #[error(transparent)]
    Turn(#[from] TurnError),
}

/// Both the STUN attempt and the TURN fallback failed.
#[derive(Debug, Error)]
#[error("transport resolution failed (STUN: {stun}; TURN: {turn})")]
pub struct ResolutionError {
    pub stun: StunError,
    pub turn: TurnFallbackError,
}

/// Fatal conditions of one call leg.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The media socket failed to send or receive
    #[error("Socket error: {0}")]
    Socket(NetworkError),

    /// An outgoing packet could not be serialized
    #[error("Packet error: {0}")]
    Packet(NetworkError),

    /// A codec handle could not be created
    #[error("Codec lifecycle error: {0}")]
    EncoderLifecycle(MediaError),

    #[error("Encode error: {0}")]
    Encode(MediaError),

    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("Capture error: {0}")]
    Capture(MediaError),

    #[error("Playback error: {0}")]
    Playback(MediaError),

    #[error("Thread error: {0}")]
    Thread(String),
}

/// Top-level error of the crate.
#[derive(Debug, Error)]
pub enum VoipError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("SDP error: {0}")]
    Sdp(#[from] SdpError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_names_both_causes() {
        let err = ResolutionError {
            stun: StunError::Timeout,
            turn: TurnFallbackError::NotConfigured,
        };
        let text = err.to_string();
        assert!(text.contains("STUN"));
        assert!(text.contains("no TURN server configured"));
    }

    #[test]
    fn test_turn_error_converts() {
        let err: TurnFallbackError = TurnError::Timeout.into();
        assert!(matches!(err, TurnFallbackError::Turn(TurnError::Timeout)));
    }

    #[test]
    fn test_session_error_into_voip_error() {
        let err: VoipError = SessionError::UnsupportedCodec("G729".to_string()).into();
        assert_eq!(err.to_string(), "Unsupported codec: G729");
    }
}
