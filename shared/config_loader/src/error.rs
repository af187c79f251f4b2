/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while locating or reading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("failed to read configuration file: {0}")]
    ReadError(String),
}
