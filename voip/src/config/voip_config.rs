use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{KeepaliveConfig, LoggingConfig, MediaConfig, StunConfig, TurnConfig};
use crate::error::{Result, VoipError};

/// File name searched for when no path is given.
pub const CONFIG_FILE_NAME: &str = "voip.json";

/// Complete endpoint configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoipConfig {
    pub stun: StunConfig,
    pub turn: Option<TurnConfig>,
    pub keepalive: KeepaliveConfig,
    pub media: MediaConfig,
    pub logging: LoggingConfig,
}

impl VoipConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = config_loader::load_config_file(path)?;
        Self::from_json(&content)
    }

    /// Loads `voip.json` from the standard search locations.
    pub fn discover() -> Result<Self> {
        let path = config_loader::find_config_file(CONFIG_FILE_NAME)?;
        Self::load_from_file(path)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: VoipConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stun.timeout_ms == 0 {
            return Err(VoipError::InvalidConfig("stun.timeout_ms must be positive".into()));
        }
        if self.keepalive.interval_secs == 0 {
            return Err(VoipError::InvalidConfig(
                "keepalive.interval_secs must be positive".into(),
            ));
        }
        if let Some(turn) = &self.turn {
            if turn.server.is_empty() {
                return Err(VoipError::InvalidConfig("turn.server is empty".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_original_constants() {
        let config = VoipConfig::default();
        assert_eq!(config.stun.server, "stun.l.google.com:19302");
        assert_eq!(config.stun.timeout_ms, 3000);
        assert!(config.turn.is_none());
        assert_eq!(config.keepalive.interval_secs, 30);
        assert_eq!(config.keepalive.window_secs, 120);
        assert_eq!(config.media.ssrc, 1234);
        assert_eq!(config.media.codec, "PCMU");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = VoipConfig::from_json(
            r#"{
                "turn": { "server": "turn.example.org:3478", "username": "alice", "password": "secret" },
                "media": { "codec": "opus" }
            }"#,
        )
        .unwrap();

        let turn = config.turn.unwrap();
        assert_eq!(turn.lifetime_secs, 600);
        assert_eq!(turn.timeout_ms, 3000);
        assert_eq!(config.media.codec, "opus");
        assert_eq!(config.media.ssrc, 1234);
        assert_eq!(config.keepalive, KeepaliveConfig::default());
    }

    #[test]
    fn test_turn_requires_credentials() {
        let result = VoipConfig::from_json(r#"{ "turn": { "server": "turn.example.org:3478" } }"#);
        assert!(matches!(result, Err(VoipError::Json(_))));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let result = VoipConfig::from_json(r#"{ "keepalive": { "interval_secs": 0 } }"#);
        assert!(matches!(result, Err(VoipError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{ "stun": { "server": "127.0.0.1:3478" } }"#).unwrap();

        let config = VoipConfig::load_from_file(&path).unwrap();
        assert_eq!(config.stun.server, "127.0.0.1:3478");
        assert_eq!(config.stun.timeout_ms, 3000);
    }

    #[test]
    fn test_load_missing_file() {
        let result = VoipConfig::load_from_file("/nonexistent/voip.json");
        assert!(matches!(result, Err(VoipError::Config(_))));
    }

    #[test]
    fn test_debug_hides_turn_password() {
        let turn = TurnConfig::new("turn.example.org:3478", "alice", "secret");
        assert!(!format!("{:?}", turn).contains("secret"));
    }
}
