use serde::{Deserialize, Serialize};

/// Media leg settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Codec used for sending until the signaling layer negotiates one
    pub codec: String,
    pub ssrc: u32,
    /// Local address the media socket binds
    pub bind_address: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        MediaConfig {
            codec: "PCMU".to_string(),
            ssrc: 1234,
            bind_address: "0.0.0.0:0".to_string(),
        }
    }
}
