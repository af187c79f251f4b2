//! Transport module - UDP media socket

pub mod udp;

pub use udp::MediaSocket;
