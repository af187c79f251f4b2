//! Thread-backed logging shared by every crate of the softphone workspace.
//!
//! A [`Logger`] hands formatted lines to a dedicated writer thread, so
//! real-time paths (the media send and receive duties) never block on disk.

pub mod error;
mod log_level;
mod log_message;
mod log_writer;
mod logger;

pub use error::{LoggingError, Result};
pub use log_level::LogLevel;
pub use logger::Logger;
