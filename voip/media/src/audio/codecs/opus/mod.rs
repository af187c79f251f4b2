//! Opus audio codec module
//!
//! Opus narrowband voice encoding and decoding through FFmpeg.

mod decoder;
mod encoder;

pub use decoder::OpusDecoder;
pub use encoder::{DEFAULT_BITRATE, OpusEncoder};

/// Dynamic RTP payload type Opus is announced under.
pub const PAYLOAD_TYPE: u8 = 96;
