//! SDP Module - Session Description Protocol
//!
//! The subset of RFC 4566 an audio-only endpoint needs: session and media
//! lines, connection data, and `rtpmap` attributes. Every line is rendered
//! with a CRLF terminator.

pub mod attribute;
pub mod connection;
pub mod errors;
pub mod media_description;
pub mod origin;
pub mod session_description;
pub mod session_description_builder;
pub mod timing;

pub use attribute::{Attribute, RtpMap};
pub use connection::Connection;
pub use errors::SdpError;
pub use media_description::MediaDescription;
pub use origin::Origin;
pub use session_description::SessionDescription;
pub use session_description_builder::SessionDescriptionBuilder;
pub use timing::Timing;
