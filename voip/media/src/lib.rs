//! Media Processing Module
//!
//! Audio frames, the PCMU and Opus codecs, payload-type dispatch, and the
//! capture/playback boundary a media leg reads from and writes to.

pub mod audio;
pub mod common;
pub mod error;

pub use error::MediaError;

pub use audio::{
    AudioDecoder, AudioEncoder, AudioFrame, AudioSample, AudioSink, AudioSource, ChannelSink,
    ChannelSource, CodecFactory, CodecRegistry, NullSink, OpusDecoder, OpusEncoder, PcmuDecoder,
    PcmuEncoder, SilenceSource,
};

#[cfg(feature = "device")]
pub use audio::{DeviceSink, DeviceSource};
