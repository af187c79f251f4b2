//! Common constants shared across media modules

/// Telephony audio format used on the wire
pub mod audio {
    /// Samples per second
    pub const SAMPLE_RATE: u32 = 8000;
    /// Mono
    pub const CHANNELS: u32 = 1;
    /// One frame of audio in milliseconds
    pub const FRAME_DURATION_MS: u64 = 20;
    /// Samples in one 20 ms frame at 8 kHz
    pub const FRAME_SAMPLES: usize = 160;
}

/// Logging intervals for frame processing
pub mod logging {
    /// Log progress every N frames (encoder)
    pub const ENCODER_LOG_INTERVAL: u64 = 100;
    /// Log progress every N frames (decoder)
    pub const DECODER_LOG_INTERVAL: u64 = 100;
}
