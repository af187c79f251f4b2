//! Audio codecs module
//!
//! Audio encoding and decoding implementations.

pub mod opus;
pub mod pcmu;

pub use opus::{OpusDecoder, OpusEncoder};
pub use pcmu::{PcmuDecoder, PcmuEncoder};
