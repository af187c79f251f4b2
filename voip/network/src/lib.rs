//! Network Module - RTP and UDP Transport
//!
//! RTP packet (de)serialization and the datagram socket a media leg sends
//! and receives through.

pub mod codec;
pub mod error;
pub mod transport;

pub use codec::{MAX_DATAGRAM_SIZE, RtpHeader, RtpPacket};
pub use error::NetworkError;
pub use transport::MediaSocket;

pub type Result<T> = std::result::Result<T, NetworkError>;
