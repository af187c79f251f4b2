//! Speaker playback using cpal

use crate::audio::io::AudioSink;
use crate::common::constants::audio::SAMPLE_RATE;
use crate::error::{MediaError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use logging::Logger;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Pre-buffer 200 ms of audio before starting, to ride out network jitter.
const PREBUFFER_SAMPLES: usize = SAMPLE_RATE as usize / 5;

/// Default output device fed with 8 kHz mono frames.
pub struct DeviceSink {
    buffer: Arc<Mutex<VecDeque<f32>>>,
    _stream: cpal::Stream,
}

// SAFETY: The stream is never accessed directly after creation.
// All audio processing happens in the stream's callback, which is managed by cpal.
// The buffer is thread-safe (Arc<Mutex<>>).
unsafe impl Send for DeviceSink {}

impl DeviceSink {
    pub fn new(logger: &Logger) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| MediaError::Audio("No output device available".into()))?;

        logger.info(&format!(
            "Using output device: {}",
            device.name().unwrap_or_default()
        ));

        let default_config = device
            .default_output_config()
            .map_err(|e| MediaError::Audio(format!("Failed to get default config: {}", e)))?;

        let device_rate = default_config.sample_rate().0;
        let output_channels = default_config.channels() as usize;
        let config: cpal::StreamConfig = default_config.into();

        // Source samples consumed per device sample.
        let ratio = SAMPLE_RATE as f32 / device_rate as f32;
        logger.info(&format!(
            "Playback at {} Hz, {} channels, resampling ratio {:.4}",
            device_rate, output_channels, ratio
        ));

        let buffer = Arc::new(Mutex::new(VecDeque::with_capacity(PREBUFFER_SAMPLES * 10)));
        let buffer_clone = Arc::clone(&buffer);

        let mut prebuffering = true;
        let mut previous = 0.0f32;
        let mut next = 0.0f32;
        let mut fractional_pos = 0.0f32;

        let error_logger = logger.clone();
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let Ok(mut buf) = buffer_clone.lock() else {
                        data.fill(0.0);
                        return;
                    };

                    if prebuffering {
                        if buf.len() < PREBUFFER_SAMPLES {
                            data.fill(0.0);
                            return;
                        }
                        prebuffering = false;
                    }

                    for frame in data.chunks_mut(output_channels) {
                        let value = previous + (next - previous) * fractional_pos;
                        frame.fill(value);

                        fractional_pos += ratio;
                        while fractional_pos >= 1.0 {
                            fractional_pos -= 1.0;
                            previous = next;
                            match buf.pop_front() {
                                Some(sample) => next = sample,
                                None => {
                                    // Underrun: refill before resuming
                                    prebuffering = true;
                                    next = 0.0;
                                }
                            }
                        }
                    }
                },
                move |err| error_logger.error(&format!("Stream error: {}", err)),
                None,
            )
            .map_err(|e| MediaError::Audio(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| MediaError::Audio(format!("Failed to play stream: {}", e)))?;

        logger.info("Audio playback stream started");

        Ok(Self {
            buffer,
            _stream: stream,
        })
    }
}

impl AudioSink for DeviceSink {
    fn write_frame(&mut self, samples: &[i16]) -> Result<()> {
        let mut buf = self
            .buffer
            .lock()
            .map_err(|_| MediaError::Audio("Playback buffer poisoned".into()))?;

        buf.extend(samples.iter().map(|&s| s as f32 / i16::MAX as f32));

        // Cap latency at ~2 s of audio
        let max_samples = PREBUFFER_SAMPLES * 10;
        if buf.len() > max_samples {
            let excess = buf.len() - max_samples;
            buf.drain(0..excess);
        }
        Ok(())
    }
}
