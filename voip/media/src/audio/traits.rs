//! Audio codec traits for encoding and decoding

use super::frame::AudioFrame;
use crate::error::Result;

/// Compresses raw audio frames.
///
/// Stateful implementations keep their state across calls, so one instance
/// must serve exactly one outgoing stream.
pub trait AudioEncoder {
    /// Encodes a single audio frame.
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - Encoded payload; empty while the encoder is still buffering
    /// * `Err` - If encoding fails
    fn encode(&mut self, frame: &AudioFrame) -> Result<Vec<u8>>;

    /// Returns the codec name (e.g., "PCMU", "opus")
    fn get_codec(&self) -> &str;
}

/// Expands compressed payloads back into raw frames.
pub trait AudioDecoder {
    /// Decodes one payload.
    ///
    /// # Returns
    /// * `Ok(Some(AudioFrame))` - Decoded frame
    /// * `Ok(None)` - The decoder needs more data before it can emit a frame
    /// * `Err` - If decoding fails or data is corrupted
    fn decode(&mut self, data: &[u8]) -> Result<Option<AudioFrame>>;

    /// Returns the codec name (e.g., "PCMU", "opus")
    fn get_codec(&self) -> &str;

    /// Resets decoder state
    fn reset(&mut self) {}
}
