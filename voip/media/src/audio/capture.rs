//! Microphone capture using cpal

use crate::audio::io::AudioSource;
use crate::common::constants::audio::SAMPLE_RATE;
use crate::error::{MediaError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use logging::Logger;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound on buffered capture, in seconds of 8 kHz audio.
const MAX_BUFFERED_SECONDS: usize = 2;
const READ_WAIT: Duration = Duration::from_millis(20);

/// Default input device, delivered as 8 kHz mono frames.
pub struct DeviceSource {
    buffer: Arc<Mutex<Vec<i16>>>,
    _stream: cpal::Stream,
}

// SAFETY: The stream is never accessed directly after creation.
// All audio processing happens in the stream's callback, which is managed by cpal.
// The buffer is thread-safe (Arc<Mutex<>>).
unsafe impl Send for DeviceSource {}

/// Downmixes interleaved device samples and picks every `step`-th one.
struct Decimator {
    channels: usize,
    step: f64,
    position: f64,
}

impl Decimator {
    fn push(&mut self, interleaved: &[f32], out: &mut Vec<i16>) {
        for frame in interleaved.chunks(self.channels) {
            self.position += 1.0;
            if self.position >= self.step {
                self.position -= self.step;
                let mono = frame.iter().sum::<f32>() / frame.len() as f32;
                out.push((mono.clamp(-1.0, 1.0) * 32767.0).round() as i16);
            }
        }
        let max_samples = SAMPLE_RATE as usize * MAX_BUFFERED_SECONDS;
        if out.len() > max_samples {
            let excess = out.len() - max_samples;
            out.drain(0..excess);
        }
    }
}

impl DeviceSource {
    pub fn new(logger: &Logger) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| MediaError::Audio("No input device available".into()))?;

        logger.info(&format!(
            "Using input device: {}",
            device.name().unwrap_or_default()
        ));

        let config = device
            .default_input_config()
            .map_err(|e| MediaError::Audio(format!("Failed to get default input config: {}", e)))?;

        logger.info(&format!(
            "Input format: {:?}, {} Hz, {} channels",
            config.sample_format(),
            config.sample_rate().0,
            config.channels()
        ));

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let mut decimator = Decimator {
            channels: config.channels().max(1) as usize,
            step: config.sample_rate().0 as f64 / SAMPLE_RATE as f64,
            position: 0.0,
        };

        let buffer_clone = Arc::clone(&buffer);
        let error_logger = logger.clone();
        let on_error = move |err: cpal::StreamError| {
            error_logger.error(&format!("Audio input error: {}", err));
        };

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer_clone.lock() {
                        decimator.push(data, &mut buf);
                    }
                },
                on_error,
                None,
            ),
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config.into(),
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<f32> = data.iter().map(|&s| s as f32 / 32768.0).collect();
                    if let Ok(mut buf) = buffer_clone.lock() {
                        decimator.push(&converted, &mut buf);
                    }
                },
                on_error,
                None,
            ),
            _ => return Err(MediaError::Audio("Unsupported input sample format".into())),
        }
        .map_err(|e| MediaError::Audio(format!("Failed to build input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| MediaError::Audio(format!("Failed to start input stream: {}", e)))?;

        logger.info("Audio capture stream started");

        Ok(Self {
            buffer,
            _stream: stream,
        })
    }
}

impl AudioSource for DeviceSource {
    fn read_frame(&mut self, samples: usize) -> Result<Option<Vec<i16>>> {
        let deadline = Instant::now() + READ_WAIT;
        loop {
            {
                let mut buf = self
                    .buffer
                    .lock()
                    .map_err(|_| MediaError::Audio("Capture buffer poisoned".into()))?;
                if buf.len() >= samples {
                    return Ok(Some(buf.drain(0..samples).collect()));
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(Duration::from_millis(2));
        }
    }
}
