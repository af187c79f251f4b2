//! Transport candidate types.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// How a candidate address was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CandidateKind {
    /// Local interface address
    #[default]
    Host,
    /// NAT-mapped address reported by a STUN server
    ServerReflexive,
    /// Address allocated on a TURN server
    Relay,
}

impl CandidateKind {
    /// Short form used in logs ("host", "srflx", "relay").
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateKind::Host => "host",
            CandidateKind::ServerReflexive => "srflx",
            CandidateKind::Relay => "relay",
        }
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single address a call leg is reachable on.
///
/// For a relay candidate `address` is the relayed transport address on the
/// TURN server, which is what the peer must send to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportCandidate {
    pub kind: CandidateKind,
    pub address: SocketAddr,
}

impl TransportCandidate {
    pub fn new(kind: CandidateKind, address: SocketAddr) -> Self {
        TransportCandidate { kind, address }
    }

    pub fn host(address: SocketAddr) -> Self {
        Self::new(CandidateKind::Host, address)
    }

    pub fn server_reflexive(address: SocketAddr) -> Self {
        Self::new(CandidateKind::ServerReflexive, address)
    }

    pub fn relay(address: SocketAddr) -> Self {
        Self::new(CandidateKind::Relay, address)
    }

    pub fn ip(&self) -> IpAddr {
        self.address.ip()
    }

    pub fn port(&self) -> u16 {
        self.address.port()
    }
}

impl fmt::Display for TransportCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.address)
    }
}
