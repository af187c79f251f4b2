//! Audio I/O boundary
//!
//! A media leg pulls fixed-size linear PCM frames from an [`AudioSource`]
//! and pushes decoded frames into an [`AudioSink`]. Hardware streams, test
//! fixtures and the signaling layer all plug in here.

use crate::error::{MediaError, Result};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// How long a channel source waits before reporting that nothing arrived.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Capture side of the boundary.
pub trait AudioSource {
    /// Reads one frame of exactly `samples` samples.
    ///
    /// Blocks for at most the source's own wait interval.
    ///
    /// # Returns
    /// * `Ok(Some(frame))` - A full frame
    /// * `Ok(None)` - Nothing was captured within the wait interval
    /// * `Err` - The source failed or reached its end
    fn read_frame(&mut self, samples: usize) -> Result<Option<Vec<i16>>>;
}

/// Playback side of the boundary.
pub trait AudioSink {
    fn write_frame(&mut self, samples: &[i16]) -> Result<()>;
}

impl<S: AudioSource + ?Sized> AudioSource for Box<S> {
    fn read_frame(&mut self, samples: usize) -> Result<Option<Vec<i16>>> {
        (**self).read_frame(samples)
    }
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn write_frame(&mut self, samples: &[i16]) -> Result<()> {
        (**self).write_frame(samples)
    }
}

/// Frames pushed through an mpsc channel. Short frames are padded with
/// silence, long ones truncated.
pub struct ChannelSource {
    receiver: Receiver<Vec<i16>>,
    poll_interval: Duration,
}

impl ChannelSource {
    pub fn new(receiver: Receiver<Vec<i16>>) -> Self {
        ChannelSource {
            receiver,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Creates a source and the sender that feeds it.
    pub fn channel() -> (Sender<Vec<i16>>, Self) {
        let (sender, receiver) = mpsc::channel();
        (sender, Self::new(receiver))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl AudioSource for ChannelSource {
    fn read_frame(&mut self, samples: usize) -> Result<Option<Vec<i16>>> {
        match self.receiver.recv_timeout(self.poll_interval) {
            Ok(mut frame) => {
                frame.resize(samples, 0);
                Ok(Some(frame))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(MediaError::StreamClosed),
        }
    }
}

/// Decoded frames forwarded into an mpsc channel.
pub struct ChannelSink {
    sender: Sender<Vec<i16>>,
}

impl ChannelSink {
    pub fn new(sender: Sender<Vec<i16>>) -> Self {
        ChannelSink { sender }
    }

    /// Creates a sink and the receiver that drains it.
    pub fn channel() -> (Self, Receiver<Vec<i16>>) {
        let (sender, receiver) = mpsc::channel();
        (Self::new(sender), receiver)
    }
}

impl AudioSink for ChannelSink {
    fn write_frame(&mut self, samples: &[i16]) -> Result<()> {
        self.sender
            .send(samples.to_vec())
            .map_err(|_| MediaError::StreamClosed)
    }
}

/// Digital silence, optionally for a fixed number of frames.
#[derive(Debug, Default)]
pub struct SilenceSource {
    remaining: Option<u64>,
}

impl SilenceSource {
    /// Never runs out.
    pub fn new() -> Self {
        SilenceSource { remaining: None }
    }

    /// Ends with `MediaError::StreamClosed` after `frames` frames.
    pub fn limited(frames: u64) -> Self {
        SilenceSource {
            remaining: Some(frames),
        }
    }
}

impl AudioSource for SilenceSource {
    fn read_frame(&mut self, samples: usize) -> Result<Option<Vec<i16>>> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Err(MediaError::StreamClosed);
            }
            *remaining -= 1;
        }
        Ok(Some(vec![0; samples]))
    }
}

/// Discards frames, counting them.
#[derive(Debug, Default)]
pub struct NullSink {
    frames: u64,
}

impl NullSink {
    pub fn new() -> Self {
        NullSink::default()
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }
}

impl AudioSink for NullSink {
    fn write_frame(&mut self, _samples: &[i16]) -> Result<()> {
        self.frames += 1;
        Ok(())
    }
}
