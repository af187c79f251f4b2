//! Codec module - RTP packet format

pub mod rtp;

pub use rtp::{MAX_DATAGRAM_SIZE, RtpHeader, RtpPacket};
