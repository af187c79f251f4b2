use std::fmt;
use std::str::FromStr;

/// Severity level of a log message.
///
/// Ordered from lowest to highest: Debug < Info < Warn < Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Per-packet and statistics output.
    Debug,
    /// Lifecycle events: resolution results, leg start and end.
    #[default]
    Info,
    /// Recoverable problems such as dropped packets.
    Warn,
    /// Failures that end a call leg.
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ();

    /// Parses a level name case-insensitively. Unknown names fall back to `Info`
    /// so a typo in a config file never disables logging.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" | "debug" => Ok(LogLevel::Debug),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Ok(LogLevel::Info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Debug.to_string(), "DEBUG");
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_log_level_from_str_aliases() {
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("Warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" error ".parse::<LogLevel>().unwrap(), LogLevel::Error);
    }

    #[test]
    fn test_log_level_from_str_default() {
        assert_eq!("verbose".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}
