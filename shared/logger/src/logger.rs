//! The [`Logger`] handle.

use crate::error::Result;
use crate::log_level::LogLevel;
use crate::log_message::LogMessage;
use crate::log_writer::spawn_writer_thread;
use std::path::PathBuf;
use std::sync::mpsc::{Sender, channel};

/// Non-blocking logger.
///
/// Clones and [`Logger::for_component`] derivatives share one channel to a
/// single writer thread, so lines from concurrent duties never interleave
/// mid-line.
///
/// # Examples
///
/// ```no_run
/// use logging::{LogLevel, Logger};
///
/// let logger = Logger::new("softphone.log".into(), LogLevel::Info).unwrap();
/// let resolver = logger.for_component("Resolver");
/// resolver.info("STUN binding succeeded");
/// ```
#[derive(Clone)]
pub struct Logger {
    sender: Sender<LogMessage>,
    level: LogLevel,
    component: Option<String>,
}

impl Logger {
    /// Creates a file-only logger.
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be created or opened.
    pub fn new(log_path: PathBuf, level: LogLevel) -> Result<Self> {
        Self::spawn(Some(log_path), level, None, false)
    }

    /// Creates a file logger tagged with `component`, optionally echoing to stderr.
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be created or opened.
    pub fn with_component(
        log_path: PathBuf,
        level: LogLevel,
        component: &str,
        console_output: bool,
    ) -> Result<Self> {
        Self::spawn(Some(log_path), level, Some(component), console_output)
    }

    /// Creates a logger that only writes to stderr.
    pub fn console(level: LogLevel, component: &str) -> Result<Self> {
        Self::spawn(None, level, Some(component), true)
    }

    fn spawn(
        log_path: Option<PathBuf>,
        level: LogLevel,
        component: Option<&str>,
        console_output: bool,
    ) -> Result<Self> {
        let (sender, receiver) = channel();
        spawn_writer_thread(log_path.as_deref(), console_output, receiver)?;
        Ok(Logger {
            sender,
            level,
            component: component.map(str::to_string),
        })
    }

    /// Derives a logger with another component tag that shares this logger's
    /// writer thread and level.
    pub fn for_component(&self, component: &str) -> Self {
        Logger {
            sender: self.sender.clone(),
            level: self.level,
            component: Some(component.to_string()),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn log(&self, level: LogLevel, message: &str) {
        if level < self.level {
            return;
        }
        // The writer only disappears at process teardown; losing a line then is fine.
        let _ = self
            .sender
            .send(LogMessage::new(level, self.component.as_deref(), message));
    }
}
