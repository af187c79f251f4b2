//! TURN client implementation.
//!
//! Allocates a UDP relay address on a TURN server using long-term
//! credentials, keeps it alive with Refresh, and releases it on drop.

use crate::credentials::LongTermCredentials;
use crate::errors::{Result, TurnError};
use crate::turn_attribute_type::{TransportProtocol, TurnAttributeType};
use crate::turn_message_type::TurnMethod;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use logging::Logger;
use stun::{AttributeType, Message, MessageBuilder, MessageClass, xor_address};

/// Default allocation lifetime in seconds (10 minutes).
pub const DEFAULT_LIFETIME: u32 = 600;
/// Refresh this long before the allocation would expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Maximum UDP packet size
const MAX_UDP_PACKET_SIZE: usize = 1500;
/// Unauthenticated try, challenged try, one stale-nonce retry.
const MAX_ATTEMPTS: usize = 3;

/// TURN client owning the socket the allocation is bound to.
pub struct TurnClient {
    socket: UdpSocket,
    server_addr: SocketAddr,
    credentials: LongTermCredentials,
    relay_addr: Option<SocketAddr>,
    mapped_addr: Option<SocketAddr>,
    requested_lifetime: u32,
    lifetime: u32,
    last_refresh: Option<Instant>,
    timeout: Duration,
    logger: Option<Logger>,
}

impl TurnClient {
    /// Binds a socket on `bind_addr` for talking to the server at `server_addr`.
    pub fn new(
        bind_addr: SocketAddr,
        server_addr: SocketAddr,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(bind_addr)?;
        socket.set_write_timeout(Some(DEFAULT_TIMEOUT))?;

        Ok(TurnClient {
            socket,
            server_addr,
            credentials: LongTermCredentials::new(username, password),
            relay_addr: None,
            mapped_addr: None,
            requested_lifetime: DEFAULT_LIFETIME,
            lifetime: 0,
            last_refresh: None,
            timeout: DEFAULT_TIMEOUT,
            logger: None,
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger.for_component("TURN Client"));
        self
    }

    /// Bounds the wait for each response.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Lifetime to ask for in Allocate requests.
    pub fn with_lifetime(mut self, lifetime: u32) -> Self {
        self.requested_lifetime = lifetime;
        self
    }

    /// Allocates a relay address on the TURN server.
    pub fn allocate(&mut self) -> Result<SocketAddr> {
        self.log_info(&format!("Sending Allocate request to {}", self.server_addr));

        let attributes = vec![
            (
                TurnAttributeType::RequestedTransport.to_u16(),
                TransportProtocol::Udp.to_attribute_value().to_vec(),
            ),
            (
                TurnAttributeType::Lifetime.to_u16(),
                self.requested_lifetime.to_be_bytes().to_vec(),
            ),
        ];

        let response = self
            .transact(TurnMethod::Allocate, &attributes)
            .inspect_err(|e| self.log_error(&format!("Allocate failed: {}", e)))?;

        let relay_value = response
            .attribute(TurnAttributeType::XorRelayedAddress)
            .ok_or_else(|| TurnError::AllocationFailed("missing XOR-RELAYED-ADDRESS".to_string()))?;
        let relay_addr = xor_address::decode(relay_value, &response.transaction_id())?;

        self.mapped_addr = response.xor_mapped_address().ok();
        self.lifetime = read_lifetime(&response).unwrap_or(self.requested_lifetime);
        self.relay_addr = Some(relay_addr);
        self.last_refresh = Some(Instant::now());

        self.log_info(&format!(
            "Allocated relay address {} (lifetime {}s)",
            relay_addr, self.lifetime
        ));
        Ok(relay_addr)
    }

    /// Refreshes the allocation. A lifetime of 0 deletes it.
    pub fn refresh(&mut self, lifetime: u32) -> Result<()> {
        self.ensure_allocation()?;
        self.log_info(&format!("Refreshing allocation (lifetime: {}s)", lifetime));

        let attributes = vec![(
            TurnAttributeType::Lifetime.to_u16(),
            lifetime.to_be_bytes().to_vec(),
        )];
        let response = self
            .transact(TurnMethod::Refresh, &attributes)
            .map_err(|e| match e {
                TurnError::Timeout => TurnError::Timeout,
                other => TurnError::RefreshFailed(other.to_string()),
            })?;

        if lifetime == 0 {
            self.relay_addr = None;
            self.last_refresh = None;
            self.lifetime = 0;
            self.log_info("Allocation released");
        } else {
            self.lifetime = read_lifetime(&response).unwrap_or(lifetime);
            self.last_refresh = Some(Instant::now());
        }
        Ok(())
    }

    /// Releases the allocation and waits for the server to confirm.
    pub fn deallocate(&mut self) -> Result<()> {
        self.refresh(0)
    }

    pub fn relay_address(&self) -> Option<SocketAddr> {
        self.relay_addr
    }

    /// Server-reflexive address reported alongside the relay, if any.
    pub fn mapped_address(&self) -> Option<SocketAddr> {
        self.mapped_addr
    }

    /// Lifetime granted by the server, in seconds.
    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Second handle on the socket the allocation is bound to.
    pub fn try_clone_socket(&self) -> Result<UdpSocket> {
        Ok(self.socket.try_clone()?)
    }

    /// True when less than a minute of the granted lifetime remains.
    pub fn needs_refresh(&self) -> bool {
        match (self.relay_addr, self.last_refresh) {
            (Some(_), Some(last)) => {
                let lifetime = Duration::from_secs(u64::from(self.lifetime));
                last.elapsed() + REFRESH_MARGIN >= lifetime
            }
            _ => false,
        }
    }

    fn ensure_allocation(&self) -> Result<()> {
        if self.relay_addr.is_none() {
            return Err(TurnError::NoAllocation);
        }
        Ok(())
    }

    /// Runs one request/response exchange, answering 401 challenges and
    /// 438 stale-nonce errors by resending with fresh credentials.
    fn transact(&mut self, method: TurnMethod, attributes: &[(u16, Vec<u8>)]) -> Result<Message> {
        for _ in 0..MAX_ATTEMPTS {
            let request = self.build_request(method, attributes)?;
            let response = self.send_and_receive(&request)?;

            if response.message_type() == method.request().success() {
                return Ok(response);
            }
            if response.message_type() != method.request().error() {
                return Err(TurnError::AttributeError(format!(
                    "unexpected {} response type {}",
                    method.as_str(),
                    response.message_type()
                )));
            }

            let (code, reason) = response
                .error_code()
                .ok_or_else(|| TurnError::AttributeError("error response without ERROR-CODE".to_string()))?;

            match code {
                401 if !self.credentials.is_challenged() => {
                    self.credentials.realm = response.text_attribute(AttributeType::Realm);
                    self.credentials.nonce = response.attribute(AttributeType::Nonce).map(<[u8]>::to_vec);
                    if !self.credentials.is_challenged() {
                        return Err(TurnError::AuthenticationFailed(
                            "challenge without REALM or NONCE".to_string(),
                        ));
                    }
                    self.log_info("Server requested long-term credentials");
                }
                438 => {
                    let nonce = response.attribute(AttributeType::Nonce).map(<[u8]>::to_vec);
                    if nonce.is_none() {
                        return Err(TurnError::from_error_code(code, reason));
                    }
                    self.credentials.nonce = nonce;
                    self.log_info("Nonce went stale, retrying");
                }
                _ => return Err(TurnError::from_error_code(code, reason)),
            }
        }

        Err(TurnError::AuthenticationFailed(format!(
            "{} still rejected after {} attempts",
            method.as_str(),
            MAX_ATTEMPTS
        )))
    }

    fn build_request(&self, method: TurnMethod, attributes: &[(u16, Vec<u8>)]) -> Result<Message> {
        let mut builder = MessageBuilder::new(method.request()).random_transaction_id();
        for (attr_type, value) in attributes {
            builder = builder.attribute(*attr_type, value);
        }

        if let (Some(realm), Some(nonce)) = (&self.credentials.realm, &self.credentials.nonce) {
            builder = builder
                .attribute(AttributeType::Username, self.credentials.username.as_bytes())
                .attribute(AttributeType::Realm, realm.as_bytes())
                .attribute(AttributeType::Nonce, nonce)
                .integrity(&self.credentials.key());
        }

        Ok(builder.build()?)
    }

    /// Sends `request` and waits for the response with the same transaction ID.
    ///
    /// The read timeout in force before the exchange is put back afterwards,
    /// since a cloned handle shares it.
    fn send_and_receive(&self, request: &Message) -> Result<Message> {
        let previous_timeout = self.socket.read_timeout()?;
        let result = self.exchange(request);
        self.socket.set_read_timeout(previous_timeout)?;
        result
    }

    fn exchange(&self, request: &Message) -> Result<Message> {
        self.socket.send_to(&request.encode(), self.server_addr)?;

        let deadline = Instant::now() + self.timeout;
        let mut buffer = [0u8; MAX_UDP_PACKET_SIZE];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(TurnError::Timeout);
            }
            self.socket.set_read_timeout(Some(remaining))?;

            let (len, from) = self.socket.recv_from(&mut buffer)?;
            if from != self.server_addr {
                continue;
            }
            if let Ok(response) = Message::decode(&buffer[..len]) {
                if response.transaction_id() == request.transaction_id()
                    && response.message_type().class != MessageClass::Request
                {
                    return Ok(response);
                }
            }
        }
    }

    fn log_info(&self, message: &str) {
        if let Some(ref logger) = self.logger {
            logger.info(message);
        }
    }

    fn log_error(&self, message: &str) {
        if let Some(ref logger) = self.logger {
            logger.error(message);
        }
    }
}

impl Drop for TurnClient {
    /// Best-effort release: sends Refresh(lifetime 0) without waiting.
    fn drop(&mut self) {
        if self.relay_addr.is_none() {
            return;
        }
        let attributes = vec![(TurnAttributeType::Lifetime.to_u16(), 0u32.to_be_bytes().to_vec())];
        if let Ok(request) = self.build_request(TurnMethod::Refresh, &attributes) {
            let _ = self.socket.send_to(&request.encode(), self.server_addr);
        }
        self.log_info("Allocation released on drop");
    }
}

fn read_lifetime(response: &Message) -> Option<u32> {
    let value = response.attribute(TurnAttributeType::Lifetime)?;
    let bytes: [u8; 4] = value.get(..4)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stun::MessageType;

    fn client() -> TurnClient {
        TurnClient::new(
            "127.0.0.1:0".parse().unwrap(),
            "127.0.0.1:3478".parse().unwrap(),
            "alice",
            "secret",
        )
        .unwrap()
    }

    #[test]
    fn test_needs_refresh() {
        let mut client = client();
        assert!(!client.needs_refresh());

        client.relay_addr = Some("198.51.100.1:5000".parse().unwrap());
        client.last_refresh = Some(Instant::now());
        client.lifetime = 600;
        assert!(!client.needs_refresh());

        client.lifetime = 30;
        assert!(client.needs_refresh());
    }

    #[test]
    fn test_refresh_without_allocation() {
        let mut client = client();
        assert!(matches!(client.refresh(600), Err(TurnError::NoAllocation)));
    }

    #[test]
    fn test_unchallenged_request_has_no_integrity() {
        let client = client();
        let request = client.build_request(TurnMethod::Allocate, &[]).unwrap();

        assert_eq!(request.message_type(), MessageType::from_u16(0x0003).unwrap());
        assert!(request.attribute(AttributeType::MessageIntegrity).is_none());
    }

    #[test]
    fn test_challenged_request_is_signed() {
        let mut client = client();
        client.credentials.realm = Some("example.org".to_string());
        client.credentials.nonce = Some(b"n0nce".to_vec());

        let request = client.build_request(TurnMethod::Allocate, &[]).unwrap();
        assert_eq!(request.text_attribute(AttributeType::Username).as_deref(), Some("alice"));
        assert_eq!(
            stun::integrity::verify_message_integrity(&request, &client.credentials.key()),
            Ok(())
        );
    }

    #[test]
    fn test_read_lifetime() {
        let mut message = Message::new(MessageType::from_u16(0x0103).unwrap(), [0; 12]);
        assert_eq!(read_lifetime(&message), None);
        message.add_attribute(TurnAttributeType::Lifetime, &300u32.to_be_bytes());
        assert_eq!(read_lifetime(&message), Some(300));
    }
}
