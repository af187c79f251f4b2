//! Opus audio decoder implementation
//!
//! Decodes with FFmpeg and converts whatever rate and layout the decoder
//! produces down to the configured rate and channel count.

use crate::audio::frame::AudioFrame;
use crate::audio::traits::AudioDecoder;
use crate::common::constants::logging::DECODER_LOG_INTERVAL;
use crate::error::{MediaError, Result};
use ffmpeg::decoder::audio::Audio as FfmpegAudioDecoder;
use ffmpeg_next as ffmpeg;
use logging::Logger;

/// Opus audio decoder.
///
/// One instance per incoming stream. FFmpeg's Opus decoders emit 48 kHz
/// float or 16-bit PCM; samples are mixed to mono when the target is mono
/// and averaged down to the target rate.
pub struct OpusDecoder {
    decoder: FfmpegAudioDecoder,
    logger: Logger,
    frame_count: u64,
    sample_rate: u32,
    channels: u32,
}

impl OpusDecoder {
    /// Creates a new Opus decoder producing `sample_rate` Hz, `channels` channel audio.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Codec` if FFmpeg has no Opus decoder.
    pub fn new(sample_rate: u32, channels: u32, logger: Logger) -> Result<Self> {
        logger.info(&format!(
            "Initializing Opus decoder: sample_rate={}, channels={}",
            sample_rate, channels
        ));

        if !(1..=2).contains(&channels) {
            return Err(MediaError::Codec(format!(
                "Unsupported channel count: {}",
                channels
            )));
        }

        ffmpeg::init().map_err(|e| MediaError::Codec(format!("FFmpeg init error: {}", e)))?;

        let codec = ffmpeg::decoder::find(ffmpeg::codec::Id::OPUS)
            .ok_or_else(|| MediaError::Codec("Opus codec not found".to_string()))?;

        let ctx = ffmpeg::codec::context::Context::new_with_codec(codec);
        let decoder = ctx
            .decoder()
            .audio()
            .map_err(|e| MediaError::Codec(format!("Error creating/opening decoder: {}", e)))?;

        logger.info("Opus decoder initialized successfully");

        Ok(OpusDecoder {
            decoder,
            logger,
            frame_count: 0,
            sample_rate,
            channels,
        })
    }

    /// Interleaved i16 samples from any of the formats FFmpeg's Opus decoders use.
    fn extract_samples(frame: &ffmpeg::frame::Audio) -> Result<Vec<i16>> {
        use ffmpeg::format::Sample;
        use ffmpeg::format::sample::Type;

        let sample_count = frame.samples();
        let channels = frame.channels() as usize;

        let samples = match frame.format() {
            Sample::F32(Type::Planar) => {
                let planes: Vec<Vec<i16>> = (0..channels)
                    .map(|ch| f32_plane(frame.data(ch), sample_count))
                    .collect();
                interleave(&planes, sample_count)
            }
            Sample::F32(Type::Packed) => f32_plane(frame.data(0), sample_count * channels),
            Sample::I16(Type::Packed) => i16_plane(frame.data(0), sample_count * channels),
            Sample::I16(Type::Planar) => {
                let planes: Vec<Vec<i16>> = (0..channels)
                    .map(|ch| i16_plane(frame.data(ch), sample_count))
                    .collect();
                interleave(&planes, sample_count)
            }
            other => {
                return Err(MediaError::Codec(format!(
                    "Unsupported audio format from decoder: {:?}",
                    other
                )));
            }
        };

        Ok(samples)
    }
}

fn f32_plane(data: &[u8], count: usize) -> Vec<i16> {
    data.chunks_exact(4)
        .take(count)
        .map(|b| convert_f32_to_i16(f32::from_ne_bytes([b[0], b[1], b[2], b[3]])))
        .collect()
}

fn i16_plane(data: &[u8], count: usize) -> Vec<i16> {
    data.chunks_exact(2)
        .take(count)
        .map(|b| i16::from_ne_bytes([b[0], b[1]]))
        .collect()
}

fn interleave(planes: &[Vec<i16>], sample_count: usize) -> Vec<i16> {
    let mut samples = Vec::with_capacity(sample_count * planes.len());
    for i in 0..sample_count {
        for plane in planes {
            samples.push(plane.get(i).copied().unwrap_or(0));
        }
    }
    samples
}

#[inline]
fn convert_f32_to_i16(sample_f32: f32) -> i16 {
    let clamped = sample_f32.clamp(-1.0, 1.0);
    (clamped * 32767.0).round() as i16
}

/// Mixes interleaved audio down to mono by averaging channels.
fn mix_to_mono(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| (frame.iter().map(|&s| s as i32).sum::<i32>() / frame.len() as i32) as i16)
        .collect()
}

/// Lowers the rate of mono audio by averaging blocks of `from / to` samples.
/// Rates that do not divide evenly fall back to nearest-sample picking.
fn downsample(samples: &[i16], from: u32, to: u32) -> Vec<i16> {
    if to == 0 || from <= to {
        return samples.to_vec();
    }
    if from % to == 0 {
        let factor = (from / to) as usize;
        return samples
            .chunks(factor)
            .map(|block| (block.iter().map(|&s| s as i32).sum::<i32>() / block.len() as i32) as i16)
            .collect();
    }

    let out_len = (samples.len() as u64 * to as u64 / from as u64) as usize;
    (0..out_len)
        .filter_map(|i| samples.get((i as u64 * from as u64 / to as u64) as usize).copied())
        .collect()
}

impl AudioDecoder for OpusDecoder {
    fn decode(&mut self, data: &[u8]) -> Result<Option<AudioFrame>> {
        if data.is_empty() {
            return Ok(None);
        }

        let packet = ffmpeg::Packet::copy(data);
        self.decoder
            .send_packet(&packet)
            .map_err(|e| MediaError::Codec(format!("Error sending packet to decoder: {}", e)))?;

        let mut decoded_frame = ffmpeg::frame::Audio::empty();
        if self.decoder.receive_frame(&mut decoded_frame).is_err() {
            return Ok(None);
        }

        self.frame_count += 1;
        if self.frame_count.is_multiple_of(DECODER_LOG_INTERVAL) {
            self.logger.debug(&format!(
                "Decoded audio frame #{}, samples: {}, rate: {}",
                self.frame_count,
                decoded_frame.samples(),
                decoded_frame.rate()
            ));
        }

        let decoded_channels = decoded_frame.channels() as usize;
        let mut samples = Self::extract_samples(&decoded_frame)?;
        let mut channels = decoded_channels as u32;

        if self.channels == 1 && decoded_channels > 1 {
            samples = mix_to_mono(&samples, decoded_channels);
            channels = 1;
        }
        if channels == 1 {
            samples = downsample(&samples, decoded_frame.rate(), self.sample_rate);
        }

        Ok(Some(AudioFrame::new(samples, channels, self.sample_rate)))
    }

    fn get_codec(&self) -> &str {
        "opus"
    }

    fn reset(&mut self) {
        self.decoder.flush();
    }
}

impl Drop for OpusDecoder {
    fn drop(&mut self) {
        self.logger.info(&format!(
            "Opus decoder released. Total frames decoded: {}",
            self.frame_count
        ));
    }
}
