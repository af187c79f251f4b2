//! Audio frame representation.

use crate::common::constants::audio::{CHANNELS, SAMPLE_RATE};

/// Audio sample data type (16-bit PCM)
pub type AudioSample = i16;

/// Block of linear PCM samples with its format
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// Raw audio samples (interleaved for multi-channel)
    pub samples: Vec<AudioSample>,
    /// Number of channels
    pub channels: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioFrame {
    pub fn new(samples: Vec<AudioSample>, channels: u32, sample_rate: u32) -> Self {
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    /// 8 kHz mono frame, the format carried on the wire.
    pub fn telephony(samples: Vec<AudioSample>) -> Self {
        Self::new(samples, CHANNELS, SAMPLE_RATE)
    }

    /// Returns the number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Returns the duration of this audio frame in milliseconds
    pub fn duration_ms(&self) -> f64 {
        (self.frame_count() as f64 / self.sample_rate as f64) * 1000.0
    }
}
