//! Endpoint configuration

pub mod logging_config;
pub mod media_config;
pub mod transport_config;
pub mod voip_config;

pub use logging_config::LoggingConfig;
pub use media_config::MediaConfig;
pub use transport_config::{KeepaliveConfig, StunConfig, TurnConfig};
pub use voip_config::{CONFIG_FILE_NAME, VoipConfig};
