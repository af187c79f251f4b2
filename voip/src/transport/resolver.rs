//! Two-tier transport resolution: STUN binding discovery, then TURN.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use logging::Logger;
use network::{MediaSocket, NetworkError};
use stun::{StunClient, StunError};
use turn::{TurnClient, TurnError};

use crate::config::{TurnConfig, VoipConfig};
use crate::error::{ResolutionError, TurnFallbackError};
use crate::transport::candidate::TransportCandidate;
use crate::transport::keepalive::{KeepaliveReport, KeepaliveTimer};

/// Servers, credentials and timers the resolver works with.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub stun_server: String,
    pub stun_timeout: Duration,
    pub turn: Option<TurnConfig>,
    pub keepalive_interval: Duration,
    pub keepalive_window: Duration,
}

impl ResolverConfig {
    pub fn from_config(config: &VoipConfig) -> Self {
        ResolverConfig {
            stun_server: config.stun.server.clone(),
            stun_timeout: config.stun.timeout(),
            turn: config.turn.clone(),
            keepalive_interval: config.keepalive.interval(),
            keepalive_window: config.keepalive.window(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::from_config(&VoipConfig::default())
    }
}

/// Resolves the transport candidate of a call leg.
pub struct Resolver {
    config: ResolverConfig,
    logger: Logger,
}

impl Resolver {
    pub fn new(config: ResolverConfig, logger: &Logger) -> Self {
        Resolver {
            config,
            logger: logger.for_component("Resolver"),
        }
    }

    /// Runs STUN discovery from `bind_hint`, falling back to a TURN
    /// allocation if it fails.
    ///
    /// The socket that obtained the candidate is kept for the media leg. On
    /// success through STUN a keepalive timer maintains its mapping from a
    /// second handle. On failure every socket opened along the way is
    /// already closed and no timer is running.
    pub fn resolve(&self, bind_hint: SocketAddr) -> Result<ResolvedTransport, ResolutionError> {
        let started = Instant::now();

        let stun_error = match self.discover_reflexive(bind_hint) {
            Ok((client, socket, address)) => {
                self.logger
                    .info(&format!("Server reflexive address {}", address));
                let keepalive = self.start_keepalive(client, started);
                return Ok(ResolvedTransport {
                    candidate: TransportCandidate::server_reflexive(address),
                    socket,
                    keepalive,
                    relay: None,
                });
            }
            Err(e) => e,
        };

        self.logger
            .warn(&format!("STUN discovery failed: {}; trying TURN", stun_error));

        match self.allocate_relay(bind_hint) {
            Ok((client, socket, address)) => {
                self.logger.info(&format!("Relay address {}", address));
                Ok(ResolvedTransport {
                    candidate: TransportCandidate::relay(address),
                    socket,
                    keepalive: None,
                    relay: Some(client),
                })
            }
            Err(turn_error) => {
                let error = ResolutionError {
                    stun: stun_error,
                    turn: turn_error,
                };
                self.logger.error(&error.to_string());
                Err(error)
            }
        }
    }

    fn discover_reflexive(
        &self,
        bind: SocketAddr,
    ) -> Result<(StunClient, UdpSocket, SocketAddr), StunError> {
        let server = pick_address(&self.config.stun_server, bind).ok_or_else(|| {
            StunError::SocketError(format!(
                "cannot resolve STUN server {}",
                self.config.stun_server
            ))
        })?;

        self.logger
            .debug(&format!("Binding request to {} from {}", server, bind));
        let client = StunClient::new(bind, server)?.with_timeout(self.config.stun_timeout);
        let address = client.get_reflexive_address()?;
        let socket = client.try_clone_socket()?;
        Ok((client, socket, address))
    }

    fn allocate_relay(
        &self,
        bind: SocketAddr,
    ) -> Result<(TurnClient, UdpSocket, SocketAddr), TurnFallbackError> {
        let turn = self
            .config
            .turn
            .as_ref()
            .ok_or(TurnFallbackError::NotConfigured)?;
        let server = pick_address(&turn.server, bind)
            .ok_or_else(|| TurnFallbackError::InvalidServer(turn.server.clone()))?;

        let mut client = TurnClient::new(bind, server, &turn.username, &turn.password)?
            .with_logger(self.logger.clone())
            .with_timeout(turn.timeout())
            .with_lifetime(turn.lifetime_secs);
        let address = client.allocate()?;
        let socket = client.try_clone_socket()?;
        Ok((client, socket, address))
    }

    fn start_keepalive(&self, client: StunClient, started: Instant) -> Option<KeepaliveTimer> {
        match KeepaliveTimer::start(
            client,
            self.config.keepalive_interval,
            self.config.keepalive_window,
            started,
            self.logger.for_component("Keepalive"),
        ) {
            Ok(timer) => Some(timer),
            Err(e) => {
                self.logger
                    .warn(&format!("Could not start keepalive thread: {}", e));
                None
            }
        }
    }
}

/// Resolves `server` and prefers an address of the same family as `bind`.
fn pick_address(server: &str, bind: SocketAddr) -> Option<SocketAddr> {
    let addrs: Vec<SocketAddr> = server.to_socket_addrs().ok()?.collect();
    addrs
        .iter()
        .find(|a| a.is_ipv4() == bind.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}

/// A resolved candidate, the socket it belongs to, and whatever keeps it
/// alive.
///
/// Holds the keepalive timer of a STUN mapping or the TURN client owning a
/// relay allocation. Dropping it cancels the timer and releases the relay.
pub struct ResolvedTransport {
    candidate: TransportCandidate,
    socket: UdpSocket,
    keepalive: Option<KeepaliveTimer>,
    relay: Option<TurnClient>,
}

impl ResolvedTransport {
    pub fn candidate(&self) -> TransportCandidate {
        self.candidate
    }

    /// Local address of the socket behind the candidate.
    pub fn local_addr(&self) -> Result<SocketAddr, NetworkError> {
        Ok(self.socket.local_addr()?)
    }

    /// Media socket for a leg towards `remote`, sharing the port the
    /// candidate was discovered or allocated from.
    ///
    /// RTP leaves from the advertised mapping, and keepalive traffic keeps
    /// the same mapping open.
    pub fn media_socket(&self, remote: SocketAddr, logger: Logger) -> Result<MediaSocket, NetworkError> {
        let socket = self.socket.try_clone()?;
        logger.info(&format!(
            "Media socket on {} ({}) for peer {}",
            socket.local_addr()?,
            self.candidate,
            remote
        ));
        Ok(MediaSocket::from_socket(socket, remote, logger))
    }

    pub fn keepalive(&self) -> Option<&KeepaliveTimer> {
        self.keepalive.as_ref()
    }

    pub fn relay(&self) -> Option<&TurnClient> {
        self.relay.as_ref()
    }

    /// Refreshes the relay allocation when it is close to expiring.
    ///
    /// Returns whether a refresh was sent.
    pub fn maintain_relay(&mut self) -> Result<bool, TurnError> {
        match self.relay.as_mut() {
            Some(client) if client.needs_refresh() => {
                let lifetime = client.lifetime();
                client.refresh(lifetime)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Stops the keepalive and deletes the relay allocation.
    pub fn shutdown(mut self) -> Result<Option<KeepaliveReport>, TurnError> {
        let report = self.keepalive.take().and_then(|mut timer| timer.cancel());
        if let Some(mut client) = self.relay.take() {
            client.deallocate()?;
        }
        Ok(report)
    }
}
