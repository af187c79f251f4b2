//! Payload-type dispatch across the registered audio codecs.
//!
//! Receive paths look codecs up by RTP payload type, send paths by the
//! negotiated codec name. Adding a codec is a `register` call.

use std::collections::BTreeMap;
use std::fmt;

use crate::audio::codecs::opus::{self, DEFAULT_BITRATE};
use crate::audio::codecs::{OpusDecoder, OpusEncoder, PcmuDecoder, PcmuEncoder, pcmu};
use crate::audio::frame::AudioFrame;
use crate::audio::traits::{AudioDecoder, AudioEncoder};
use crate::common::constants::audio::{CHANNELS, SAMPLE_RATE};
use crate::error::{MediaError, Result};
use logging::Logger;

pub type BoxedEncoder = Box<dyn AudioEncoder + Send>;
pub type BoxedDecoder = Box<dyn AudioDecoder + Send>;

/// How to build one codec, and what it is called on the wire.
#[derive(Clone, Copy)]
pub struct CodecFactory {
    pub name: &'static str,
    pub payload_type: u8,
    pub clock_rate: u32,
    pub channels: u8,
    pub new_encoder: fn(&Logger) -> Result<BoxedEncoder>,
    pub new_decoder: fn(&Logger) -> Result<BoxedDecoder>,
}

impl CodecFactory {
    pub fn encoder(&self, logger: &Logger) -> Result<BoxedEncoder> {
        (self.new_encoder)(logger)
    }

    pub fn decoder(&self, logger: &Logger) -> Result<BoxedDecoder> {
        (self.new_decoder)(logger)
    }

    pub fn pcmu() -> Self {
        CodecFactory {
            name: "PCMU",
            payload_type: pcmu::PAYLOAD_TYPE,
            clock_rate: SAMPLE_RATE,
            channels: 1,
            new_encoder: |_| Ok(Box::new(PcmuEncoder::new())),
            new_decoder: |_| Ok(Box::new(PcmuDecoder::new())),
        }
    }

    pub fn opus() -> Self {
        CodecFactory {
            name: "opus",
            payload_type: opus::PAYLOAD_TYPE,
            clock_rate: SAMPLE_RATE,
            channels: 1,
            new_encoder: |logger| {
                let encoder = OpusEncoder::new(
                    SAMPLE_RATE,
                    CHANNELS,
                    DEFAULT_BITRATE,
                    logger.for_component("Opus"),
                )?;
                Ok(Box::new(encoder))
            },
            new_decoder: |logger| {
                let decoder = OpusDecoder::new(SAMPLE_RATE, CHANNELS, logger.for_component("Opus"))?;
                Ok(Box::new(decoder))
            },
        }
    }
}

impl fmt::Debug for CodecFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecFactory")
            .field("name", &self.name)
            .field("payload_type", &self.payload_type)
            .field("clock_rate", &self.clock_rate)
            .field("channels", &self.channels)
            .finish()
    }
}

/// Payload type to codec mapping.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: BTreeMap<u8, CodecFactory>,
}

impl CodecRegistry {
    pub fn empty() -> Self {
        CodecRegistry {
            codecs: BTreeMap::new(),
        }
    }

    /// Adds `factory`, replacing any codec already on its payload type.
    pub fn register(&mut self, factory: CodecFactory) -> Option<CodecFactory> {
        self.codecs.insert(factory.payload_type, factory)
    }

    pub fn by_payload_type(&self, payload_type: u8) -> Result<&CodecFactory> {
        self.codecs
            .get(&payload_type)
            .ok_or(MediaError::UnsupportedPayloadType(payload_type))
    }

    /// Case-insensitive lookup by encoding name.
    pub fn by_name(&self, name: &str) -> Result<&CodecFactory> {
        self.codecs
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| MediaError::UnsupportedCodec(name.to_string()))
    }

    /// Registered codecs in payload-type order.
    pub fn codecs(&self) -> impl Iterator<Item = &CodecFactory> {
        self.codecs.values()
    }

    /// Encodes one frame with a throwaway encoder for `codec_name`.
    ///
    /// Stateful codecs lose their adaptation between calls; a media leg
    /// keeps one encoder per direction instead.
    pub fn encode_audio(
        &self,
        samples: &[i16],
        codec_name: &str,
        logger: &Logger,
    ) -> Result<(Vec<u8>, u8)> {
        let factory = self.by_name(codec_name)?;
        let mut encoder = factory.encoder(logger)?;
        let payload = encoder.encode(&AudioFrame::telephony(samples.to_vec()))?;
        Ok((payload, factory.payload_type))
    }

    /// Decodes one payload with a throwaway decoder for `payload_type`.
    pub fn decode_audio(&self, payload: &[u8], payload_type: u8, logger: &Logger) -> Result<Vec<i16>> {
        let factory = self.by_payload_type(payload_type)?;
        let mut decoder = factory.decoder(logger)?;
        Ok(decoder
            .decode(payload)?
            .map(|frame| frame.samples)
            .unwrap_or_default())
    }
}

impl Default for CodecRegistry {
    /// PCMU on payload type 0 and Opus on 96.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(CodecFactory::pcmu());
        registry.register(CodecFactory::opus());
        registry
    }
}
