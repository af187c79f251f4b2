//! Media leg management
//!
//! Runs the send and receive duties of one call leg over an RTP socket.

mod config;
mod media_loop;
mod recv_thread;
mod send_thread;
mod termination;

pub use config::MediaLoopConfig;
pub use media_loop::{LegHandle, LegOutcome, MediaLoop};
pub use termination::{LegTerminator, TerminationReason};
