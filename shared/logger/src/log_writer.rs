//! Writer thread draining the log channel.

use crate::error::{LoggingError, Result};
use crate::log_message::LogMessage;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::thread;

/// Destinations of one writer thread: an optional append-mode file and
/// optional console (stderr) echo.
pub(crate) struct LogWriter {
    file: Option<File>,
    console: bool,
}

impl LogWriter {
    pub fn new(log_path: Option<&Path>, console: bool) -> Result<Self> {
        let file = match log_path {
            Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
            None => None,
        };
        Ok(Self { file, console })
    }

    fn write_message(&mut self, message: &LogMessage) {
        let line = message.format();
        if self.console {
            eprint!("{}", line);
        }
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.write_all(line.as_bytes()).and_then(|_| file.flush()) {
                eprintln!("Error writing log: {}", e);
            }
        }
    }

    /// Runs until every sender has been dropped.
    pub fn run(mut self, receiver: Receiver<LogMessage>) {
        for message in receiver {
            self.write_message(&message);
        }
    }
}

pub(crate) fn spawn_writer_thread(
    log_path: Option<&Path>,
    console: bool,
    receiver: Receiver<LogMessage>,
) -> Result<()> {
    let writer = LogWriter::new(log_path, console)?;
    thread::Builder::new()
        .name("log-writer".to_string())
        .spawn(move || writer.run(receiver))
        .map_err(|e| LoggingError::Logging(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_level::LogLevel;
    use std::fs;
    use std::sync::mpsc::channel;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_log_writer_creates_file() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("writer.log");

        assert!(LogWriter::new(Some(&log_path), false).is_ok());
        assert!(log_path.exists());
    }

    #[test]
    fn test_log_writer_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("missing").join("writer.log");

        assert!(matches!(
            LogWriter::new(Some(&log_path), false),
            Err(LoggingError::Io(_))
        ));
    }

    #[test]
    fn test_write_message_appends() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("writer.log");

        let mut writer = LogWriter::new(Some(&log_path), false).unwrap();
        writer.write_message(&LogMessage::new(LogLevel::Info, None, "first"));
        writer.write_message(&LogMessage::new(LogLevel::Info, None, "second"));

        let content = fs::read_to_string(log_path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("second"));
    }

    #[test]
    fn test_spawn_writer_thread() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("writer.log");
        let (sender, receiver) = channel();

        spawn_writer_thread(Some(&log_path), false, receiver).unwrap();
        sender
            .send(LogMessage::new(LogLevel::Debug, Some("Test"), "thread test"))
            .unwrap();
        drop(sender);

        thread::sleep(Duration::from_millis(100));

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("thread test"));
    }
}
