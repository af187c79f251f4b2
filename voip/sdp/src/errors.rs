//! Error types for SDP operations.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SdpError {
    #[error("Line must be in format 'type=value'")]
    InvalidLineFormat,
    #[error("Failed to parse version")]
    InvalidVersion,
    #[error("SDP version must be 0")]
    InvalidVersionNumber,
    #[error("Session name cannot be empty")]
    EmptySessionName,
    #[error("SDP must contain at least one media description")]
    NoMediaSections,
    #[error("Invalid media type: {0}")]
    InvalidMediaType(String),
    #[error("Media description must have at least one format")]
    NoMediaFormats,
    #[error("Network type must be IN")]
    InvalidNetworkType,
    #[error("Address type must be IP4 or IP6")]
    InvalidAddressType,
    #[error("Address type does not match address")]
    AddressTypeMismatch,
    #[error("Invalid IP address format")]
    InvalidIpAddress,
    #[error("Invalid origin format")]
    InvalidOriginFormat,
    #[error("Invalid connection format")]
    InvalidConnectionFormat,
    #[error("Invalid timing format")]
    InvalidTimingFormat,
    #[error("Stop time must be greater than or equal to start time")]
    InvalidTiming,
    #[error("Invalid media description format")]
    InvalidMediaFormat,
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Invalid rtpmap attribute: {0}")]
    InvalidRtpMap(String),
}
