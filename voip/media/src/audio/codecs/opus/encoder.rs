//! Opus audio encoder implementation
//!
//! Encodes 20 ms frames with libopus, tuned for voice.

use crate::audio::frame::AudioFrame;
use crate::audio::traits::AudioEncoder;
use crate::common::constants::logging::ENCODER_LOG_INTERVAL;
use crate::error::{MediaError, Result};
use ffmpeg_next as ffmpeg;
use logging::Logger;

/// Default target bitrate for narrowband voice.
pub const DEFAULT_BITRATE: u32 = 16_000;

/// Opus audio encoder.
///
/// One instance per outgoing stream; the FFmpeg context is flushed and freed
/// when the encoder is dropped.
pub struct OpusEncoder {
    encoder: ffmpeg::encoder::Audio,
    logger: Logger,
    frame_count: u64,
    pts: i64,
    sample_rate: u32,
    channels: u32,
}

impl OpusEncoder {
    /// Creates a new Opus encoder
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz (8000 for telephony)
    /// * `channels` - Number of channels (1=mono, 2=stereo)
    /// * `bitrate` - Target bitrate in bits per second
    /// * `logger` - Logger instance
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Codec` if FFmpeg has no Opus encoder or the
    /// codec rejects the configuration.
    pub fn new(sample_rate: u32, channels: u32, bitrate: u32, logger: Logger) -> Result<Self> {
        logger.info(&format!(
            "Initializing Opus encoder: sample_rate={}, channels={}, bitrate={}",
            sample_rate, channels, bitrate
        ));

        ffmpeg::init().map_err(|e| MediaError::Codec(format!("FFmpeg init error: {}", e)))?;

        // The native FFmpeg encoder only runs at 48 kHz; prefer libopus.
        let codec = ffmpeg::encoder::find_by_name("libopus")
            .or_else(|| ffmpeg::encoder::find(ffmpeg::codec::Id::OPUS))
            .ok_or_else(|| MediaError::Codec("Opus codec not found".to_string()))?
            .audio()
            .map_err(|e| MediaError::Codec(format!("Not an audio codec: {}", e)))?;

        let ctx = ffmpeg::codec::context::Context::new_with_codec(*codec);
        let mut encoder = ctx
            .encoder()
            .audio()
            .map_err(|e| MediaError::Codec(format!("Error creating encoder context: {}", e)))?;

        encoder.set_rate(sample_rate as i32);
        encoder.set_format(ffmpeg::format::Sample::I16(
            ffmpeg::format::sample::Type::Packed,
        ));

        let channel_layout = match channels {
            1 => ffmpeg::ChannelLayout::MONO,
            2 => ffmpeg::ChannelLayout::STEREO,
            _ => {
                return Err(MediaError::Codec(format!(
                    "Unsupported channel count: {}",
                    channels
                )));
            }
        };
        encoder.set_channel_layout(channel_layout);

        encoder.set_bit_rate(bitrate as usize);
        encoder.set_time_base((1, sample_rate as i32));

        let mut opts = ffmpeg::Dictionary::new();
        opts.set("application", "voip");
        opts.set("frame_duration", "20");
        opts.set("packet_loss", "10");
        opts.set("vbr", "on");

        let encoder = encoder
            .open_with(opts)
            .map_err(|e| MediaError::Codec(format!("Error opening encoder: {}", e)))?;

        logger.info("Opus encoder initialized successfully");

        Ok(OpusEncoder {
            encoder,
            logger,
            frame_count: 0,
            pts: 0,
            sample_rate,
            channels,
        })
    }

    /// Drains packets still held by the encoder.
    pub fn flush(&mut self) -> Result<Vec<Vec<u8>>> {
        self.encoder
            .send_eof()
            .map_err(|e| MediaError::Codec(format!("Error flushing encoder: {}", e)))?;

        let mut packets = Vec::new();
        let mut packet = ffmpeg::Packet::empty();

        while self.encoder.receive_packet(&mut packet).is_ok() {
            if let Some(data) = packet.data() {
                packets.push(data.to_vec());
            }
        }

        Ok(packets)
    }

    fn copy_samples_to_frame(
        audio_frame: &mut ffmpeg::frame::Audio,
        samples: &[i16],
    ) -> Result<()> {
        let data = audio_frame.data_mut(0);
        let required_bytes = std::mem::size_of_val(samples);

        if required_bytes > data.len() {
            return Err(MediaError::Codec(format!(
                "Sample buffer too large: {} bytes, frame capacity: {} bytes",
                required_bytes,
                data.len()
            )));
        }

        for (chunk, sample) in data.chunks_exact_mut(2).zip(samples) {
            chunk.copy_from_slice(&sample.to_ne_bytes());
        }
        Ok(())
    }
}

impl AudioEncoder for OpusEncoder {
    fn encode(&mut self, frame: &AudioFrame) -> Result<Vec<u8>> {
        if frame.channels != self.channels {
            return Err(MediaError::Codec(format!(
                "Channel mismatch: encoder expects {}, got {}",
                self.channels, frame.channels
            )));
        }

        if frame.sample_rate != self.sample_rate {
            self.logger.warn(&format!(
                "Sample rate mismatch: encoder expects {}, got {}",
                self.sample_rate, frame.sample_rate
            ));
        }

        let frame_count = frame.frame_count();
        let mut audio_frame = ffmpeg::frame::Audio::new(
            ffmpeg::format::Sample::I16(ffmpeg::format::sample::Type::Packed),
            frame_count,
            ffmpeg::ChannelLayout::default(frame.channels as i32),
        );
        audio_frame.set_rate(self.sample_rate);
        audio_frame.set_pts(Some(self.pts));

        Self::copy_samples_to_frame(&mut audio_frame, &frame.samples)?;
        self.pts += frame_count as i64;

        self.encoder
            .send_frame(&audio_frame)
            .map_err(|e| MediaError::Codec(format!("Error sending audio frame: {}", e)))?;

        let mut encoded_packet = ffmpeg::Packet::empty();
        match self.encoder.receive_packet(&mut encoded_packet) {
            Ok(_) => {
                self.frame_count += 1;

                if self.frame_count.is_multiple_of(ENCODER_LOG_INTERVAL) {
                    self.logger.debug(&format!(
                        "Encoded audio frame #{}, size: {} bytes, pts: {}",
                        self.frame_count,
                        encoded_packet.size(),
                        self.pts
                    ));
                }

                Ok(encoded_packet.data().unwrap_or(&[]).to_vec())
            }
            Err(_) => {
                // EAGAIN: libopus holds the first frames for its lookahead
                if self.frame_count == 0 {
                    self.logger.debug("Encoder buffering initial frames");
                }
                Ok(Vec::new())
            }
        }
    }

    fn get_codec(&self) -> &str {
        "opus"
    }
}

impl Drop for OpusEncoder {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            self.logger.warn(&format!("Opus encoder flush failed: {}", e));
        }
        self.logger.info(&format!(
            "Opus encoder released. Total frames encoded: {}",
            self.frame_count
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::codecs::opus::OpusDecoder;
    use crate::audio::traits::AudioDecoder;
    use crate::common::constants::audio::{CHANNELS, FRAME_SAMPLES, SAMPLE_RATE};
    use logging::LogLevel;
    use tempfile::TempDir;

    fn create_encoder(logger: &Logger) -> Option<OpusEncoder> {
        match OpusEncoder::new(SAMPLE_RATE, CHANNELS, DEFAULT_BITRATE, logger.clone()) {
            Ok(encoder) => Some(encoder),
            Err(MediaError::Codec(reason)) => {
                println!("Skipping Opus test: {}", reason);
                None
            }
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    fn square_wave(frame: usize) -> AudioFrame {
        let samples = (0..FRAME_SAMPLES)
            .map(|i| if (frame * FRAME_SAMPLES + i) / 20 % 2 == 0 { 6000 } else { -6000 })
            .collect();
        AudioFrame::telephony(samples)
    }

    #[test]
    fn test_encoder_produces_compact_packets_that_decode_to_frames() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new(dir.path().join("opus.log"), LogLevel::Debug).unwrap();
        let Some(mut encoder) = create_encoder(&logger) else {
            return;
        };
        let mut decoder = OpusDecoder::new(SAMPLE_RATE, CHANNELS, logger.clone()).unwrap();

        let mut packets = 0;
        for frame in 0..10 {
            let payload = encoder.encode(&square_wave(frame)).unwrap();
            if payload.is_empty() {
                continue;
            }
            packets += 1;
            assert!(payload.len() < FRAME_SAMPLES);

            let decoded = decoder.decode(&payload).unwrap().unwrap();
            assert_eq!(decoded.channels, 1);
            assert_eq!(decoded.sample_rate, SAMPLE_RATE);
            assert_eq!(decoded.samples.len(), FRAME_SAMPLES);
        }
        assert!(packets >= 8, "only {} packets out of 10 frames", packets);
        assert_eq!(encoder.get_codec(), "opus");
    }

    #[test]
    fn test_encoder_rejects_channel_mismatch() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new(dir.path().join("opus.log"), LogLevel::Debug).unwrap();
        let Some(mut encoder) = create_encoder(&logger) else {
            return;
        };

        let stereo = AudioFrame::new(vec![0; FRAME_SAMPLES * 2], 2, SAMPLE_RATE);
        assert!(matches!(encoder.encode(&stereo), Err(MediaError::Codec(_))));
    }

    #[test]
    fn test_decoder_ignores_empty_payload() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new(dir.path().join("opus.log"), LogLevel::Debug).unwrap();
        let mut decoder = match OpusDecoder::new(SAMPLE_RATE, CHANNELS, logger) {
            Ok(decoder) => decoder,
            Err(e) => {
                println!("Skipping Opus test: {}", e);
                return;
            }
        };
        assert!(decoder.decode(&[]).unwrap().is_none());
    }
}
