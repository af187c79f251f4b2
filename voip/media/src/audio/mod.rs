//! Audio processing module
//!
//! Handles encoding, decoding, payload-type dispatch, and the audio I/O
//! boundary.

#[cfg(feature = "device")]
pub mod capture;
pub mod codecs;
pub mod frame;
pub mod io;
#[cfg(feature = "device")]
pub mod playback;
pub mod registry;
pub mod traits;

#[cfg(feature = "device")]
pub use capture::DeviceSource;
pub use codecs::{OpusDecoder, OpusEncoder, PcmuDecoder, PcmuEncoder};
pub use frame::{AudioFrame, AudioSample};
pub use io::{AudioSink, AudioSource, ChannelSink, ChannelSource, NullSink, SilenceSource};
#[cfg(feature = "device")]
pub use playback::DeviceSink;
pub use registry::{CodecFactory, CodecRegistry};
pub use traits::{AudioDecoder, AudioEncoder};
