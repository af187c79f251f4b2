//! G.711 mu-law (PCMU) codec
//!
//! Each 16-bit linear sample is companded to one 8-bit code with the
//! segment arithmetic of ITU-T G.711; no lookup tables, no state.

use crate::audio::frame::AudioFrame;
use crate::audio::traits::{AudioDecoder, AudioEncoder};
use crate::common::constants::audio::{CHANNELS, SAMPLE_RATE};
use crate::error::{MediaError, Result};

/// RTP payload type statically assigned to PCMU.
pub const PAYLOAD_TYPE: u8 = 0;

const BIAS: i32 = 0x84;
const CLIP: i32 = 32635;

/// Compands one linear sample to a mu-law code.
pub fn encode_sample(sample: i16) -> u8 {
    let mut magnitude = sample as i32;
    let sign = if magnitude < 0 {
        magnitude = -magnitude;
        0x80
    } else {
        0x00
    };

    magnitude = magnitude.min(CLIP) + BIAS;

    // Position of the highest set bit above bit 7 selects the segment.
    let highest_bit = 31 - (magnitude as u32).leading_zeros() as i32;
    let exponent = (highest_bit - 7).clamp(0, 7);
    let mantissa = (magnitude >> (exponent + 3)) & 0x0F;

    !(sign | (exponent << 4) as u8 | mantissa as u8)
}

/// Expands one mu-law code to a linear sample.
pub fn decode_sample(code: u8) -> i16 {
    let code = !code;
    let exponent = ((code >> 4) & 0x07) as i32;
    let mantissa = (code & 0x0F) as i32;

    let magnitude = (((mantissa << 3) + BIAS) << exponent) - BIAS;
    if code & 0x80 != 0 {
        -magnitude as i16
    } else {
        magnitude as i16
    }
}

pub fn encode(samples: &[i16]) -> Vec<u8> {
    samples.iter().map(|&s| encode_sample(s)).collect()
}

pub fn decode(codes: &[u8]) -> Vec<i16> {
    codes.iter().map(|&c| decode_sample(c)).collect()
}

#[derive(Debug, Default)]
pub struct PcmuEncoder;

impl PcmuEncoder {
    pub fn new() -> Self {
        PcmuEncoder
    }
}

impl AudioEncoder for PcmuEncoder {
    fn encode(&mut self, frame: &AudioFrame) -> Result<Vec<u8>> {
        if frame.channels != CHANNELS {
            return Err(MediaError::Codec(format!(
                "PCMU carries mono audio, got {} channels",
                frame.channels
            )));
        }
        Ok(encode(&frame.samples))
    }

    fn get_codec(&self) -> &str {
        "PCMU"
    }
}

#[derive(Debug, Default)]
pub struct PcmuDecoder;

impl PcmuDecoder {
    pub fn new() -> Self {
        PcmuDecoder
    }
}

impl AudioDecoder for PcmuDecoder {
    fn decode(&mut self, data: &[u8]) -> Result<Option<AudioFrame>> {
        Ok(Some(AudioFrame::new(decode(data), CHANNELS, SAMPLE_RATE)))
    }

    fn get_codec(&self) -> &str {
        "PCMU"
    }
}
