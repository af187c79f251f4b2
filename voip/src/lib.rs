//! # VoIP - media transport core
//!
//! Everything between a call being set up by the signaling layer and audio
//! flowing over the network.
//!
//! ## Public API
//!
//! ### Transport resolution
//! - **`Resolver`** - STUN discovery with a bounded keepalive, TURN fallback
//! - **`ResolvedTransport`** - The resolved candidate plus its keepalive or relay
//! - **`TransportCandidate`** / **`CandidateKind`** - Host, server reflexive or relay address
//!
//! ### Session description
//! - **`descriptor::build`** - Renders a candidate into SDP text
//! - **`descriptor::negotiated_codec`** - Codec name from a remote description
//! - **`CodecAnnouncement`** - One codec on the audio media line
//!
//! ### Media leg
//! - **`MediaLoop`** - Send and receive duties over one RTP socket
//! - **`LegHandle`** - Terminates and joins a spawned leg
//! - **`LegOutcome`** / **`TerminationReason`** - How a leg ended
//!
//! ### Configuration
//! - **`VoipConfig`** - STUN, TURN, keepalive, media and logging settings
//!
//! ## Example Usage
//!
//! ```no_run
//! use voip::{
//!     CodecAnnouncement, MediaLoop, MediaLoopConfig, NullSink, Resolver, ResolverConfig,
//!     SilenceSource, VoipConfig, descriptor,
//! };
//! use logging::{LogLevel, Logger};
//!
//! let config = VoipConfig::default();
//! let logger = Logger::console(LogLevel::Info, "Example").unwrap();
//!
//! let resolver = Resolver::new(ResolverConfig::from_config(&config), &logger);
//! let transport = resolver.resolve("0.0.0.0:0".parse().unwrap()).unwrap();
//! let sdp = descriptor::build(&transport.candidate(), &CodecAnnouncement::default_set()).unwrap();
//! println!("{}", sdp);
//!
//! let socket = transport
//!     .media_socket("203.0.113.5:40000".parse().unwrap(), logger.clone())
//!     .unwrap();
//! let leg = MediaLoop::new(
//!     socket,
//!     "PCMU",
//!     SilenceSource::limited(50),
//!     NullSink::new(),
//!     MediaLoopConfig::default(),
//!     &logger,
//! )
//! .spawn()
//! .unwrap();
//! let outcome = leg.join().unwrap();
//! println!("leg ended: {}", outcome.reason);
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
mod session;
mod transport;

// ===== PUBLIC API - Configuration =====
pub use config::{
    CONFIG_FILE_NAME, KeepaliveConfig, LoggingConfig, MediaConfig, StunConfig, TurnConfig,
    VoipConfig,
};

// ===== PUBLIC API - Errors =====
pub use error::{ResolutionError, Result, SessionError, TurnFallbackError, VoipError};

// ===== PUBLIC API - Transport =====
pub use transport::{
    CandidateKind, KeepaliveReport, KeepaliveStop, KeepaliveTimer, ResolvedTransport, Resolver,
    ResolverConfig, TransportCandidate,
};

// ===== PUBLIC API - Session description =====
pub use descriptor::CodecAnnouncement;

// ===== PUBLIC API - Media leg =====
pub use session::{LegHandle, LegOutcome, LegTerminator, MediaLoop, MediaLoopConfig, TerminationReason};

// ===== PUBLIC API - Re-exports =====
pub use media::{
    AudioSink, AudioSource, ChannelSink, ChannelSource, CodecFactory, CodecRegistry, NullSink,
    SilenceSource,
};
#[cfg(feature = "device")]
pub use media::{DeviceSink, DeviceSource};
pub use network::{MediaSocket, RtpHeader, RtpPacket};
pub use stun::{StunClient, StunError};
pub use turn::{TurnClient, TurnError};
