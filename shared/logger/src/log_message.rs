//! A single formatted log record.

use crate::log_level::LogLevel;
use chrono::Local;

#[derive(Debug, Clone)]
pub(crate) struct LogMessage {
    pub timestamp: String,
    pub level: LogLevel,
    pub component: Option<String>,
    pub message: String,
}

impl LogMessage {
    /// Stamps the record with the local wall-clock time.
    pub fn new(level: LogLevel, component: Option<&str>, message: &str) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            level,
            component: component.map(str::to_string),
            message: message.to_string(),
        }
    }

    /// `[timestamp] LEVEL [component: NAME]: message\n`
    pub fn format(&self) -> String {
        match self.component {
            Some(ref component) => format!(
                "[{}] {} [component: {}]: {}\n",
                self.timestamp, self.level, component, self.message
            ),
            None => format!("[{}] {}: {}\n", self.timestamp, self.level, self.message),
        }
    }
}
