//! Transport resolution
//!
//! Finds the one address a call leg is reachable on: the STUN-discovered
//! public mapping when possible, otherwise a TURN relay.

pub mod candidate;
pub mod keepalive;
pub mod resolver;

pub use candidate::{CandidateKind, TransportCandidate};
pub use keepalive::{KeepaliveReport, KeepaliveStop, KeepaliveTimer};
pub use resolver::{ResolvedTransport, Resolver, ResolverConfig};
