//! Media loop configuration

use std::time::Duration;

use crate::config::MediaConfig;
use media::common::constants::audio::{FRAME_DURATION_MS, FRAME_SAMPLES};

/// Timing and identity of one media leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLoopConfig {
    /// SSRC stamped on every outgoing packet
    pub ssrc: u32,
    /// Samples per frame, also the RTP timestamp step
    pub frame_samples: usize,
    /// Pacing interval of the send duty
    pub frame_interval: Duration,
    /// Longest a duty blocks before checking for termination
    pub poll_interval: Duration,
    /// Receive statistics are logged every this many packets
    pub stats_interval: u64,
}

impl MediaLoopConfig {
    pub fn from_media_config(media: &MediaConfig) -> Self {
        Self::default().with_ssrc(media.ssrc)
    }

    pub fn with_ssrc(mut self, ssrc: u32) -> Self {
        self.ssrc = ssrc;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for MediaLoopConfig {
    /// 20 ms frames of 160 samples at 8 kHz.
    fn default() -> Self {
        MediaLoopConfig {
            ssrc: 1234,
            frame_samples: FRAME_SAMPLES,
            frame_interval: Duration::from_millis(FRAME_DURATION_MS),
            poll_interval: Duration::from_millis(50),
            stats_interval: 250,
        }
    }
}
