//! NAT traversal settings: STUN discovery, its keepalive, and the TURN relay.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StunConfig {
    /// `host:port`, resolved at use time
    pub server: String,
    pub timeout_ms: u64,
}

impl StunConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for StunConfig {
    fn default() -> Self {
        StunConfig {
            server: "stun.l.google.com:19302".to_string(),
            timeout_ms: 3000,
        }
    }
}

/// Relay server and its long-term credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnConfig {
    pub server: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_lifetime_secs")]
    pub lifetime_secs: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_lifetime_secs() -> u32 {
    600
}

fn default_timeout_ms() -> u64 {
    3000
}

impl TurnConfig {
    pub fn new(server: &str, username: &str, password: &str) -> Self {
        TurnConfig {
            server: server.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            lifetime_secs: default_lifetime_secs(),
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl std::fmt::Debug for TurnConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnConfig")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("lifetime_secs", &self.lifetime_secs)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// NAT binding maintenance after a successful STUN discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepaliveConfig {
    pub interval_secs: u64,
    /// Total maintenance time, counted from the start of resolution
    pub window_secs: u64,
}

impl KeepaliveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        KeepaliveConfig {
            interval_secs: 30,
            window_secs: 120,
        }
    }
}
