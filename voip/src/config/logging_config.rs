use serde::{Deserialize, Serialize};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file_path: String,
    pub log_level: String,
    pub enable_console: bool,
    pub enable_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_file_path: "softphone.log".to_string(),
            log_level: "info".to_string(),
            enable_console: true,
            enable_file: true,
        }
    }
}
