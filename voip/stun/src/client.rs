//! STUN binding client
//!
//! Sends Binding Requests to a STUN server and returns the reflexive
//! (public) address the server observed.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use crate::errors::StunError;
use crate::message::Message;
use crate::message_builder::MessageBuilder;
use crate::message_type::MessageType;

/// Largest message the client expects back.
const MAX_STUN_MESSAGE_SIZE: usize = 548;

/// Default bound on the wait for a Binding Response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// STUN client owning one UDP socket.
///
/// The socket lives as long as the client, so the NAT mapping it discovers
/// can be kept open with [`StunClient::send_keepalive`].
pub struct StunClient {
    socket: UdpSocket,
    server_addr: SocketAddr,
    timeout: Duration,
}

impl StunClient {
    /// Binds a socket on `bind_addr` for talking to `server_addr`.
    pub fn new(bind_addr: SocketAddr, server_addr: SocketAddr) -> Result<Self, StunError> {
        let socket = UdpSocket::bind(bind_addr)?;
        Self::with_socket(socket, server_addr)
    }

    /// Uses an already bound socket.
    pub fn with_socket(socket: UdpSocket, server_addr: SocketAddr) -> Result<Self, StunError> {
        socket.set_write_timeout(Some(DEFAULT_TIMEOUT))?;
        Ok(Self {
            socket,
            server_addr,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Sets how long [`StunClient::get_reflexive_address`] waits for an answer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, StunError> {
        Ok(self.socket.local_addr()?)
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Second handle on the client's socket, bound to the same local port
    /// and therefore to the same NAT mapping.
    pub fn try_clone_socket(&self) -> Result<UdpSocket, StunError> {
        Ok(self.socket.try_clone()?)
    }

    /// Performs one Binding transaction.
    ///
    /// Datagrams that are not STUN, or that answer another transaction, are
    /// skipped until the timeout elapses.
    pub fn get_reflexive_address(&self) -> Result<SocketAddr, StunError> {
        let request = MessageBuilder::new(MessageType::BINDING_REQUEST)
            .random_transaction_id()
            .build()?;
        self.socket.send_to(&request.encode(), self.server_addr)?;

        let response = self.await_response(request.transaction_id())?;
        response.check_error()?;
        if response.message_type() != MessageType::BINDING_RESPONSE {
            return Err(StunError::UnexpectedMessageType(
                response.message_type().to_u16(),
            ));
        }

        response.xor_mapped_address()
    }

    fn await_response(&self, transaction_id: [u8; 12]) -> Result<Message, StunError> {
        let deadline = Instant::now() + self.timeout;
        let mut buf = [0u8; MAX_STUN_MESSAGE_SIZE];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(StunError::Timeout);
            }
            self.socket.set_read_timeout(Some(remaining))?;

            let (size, from) = self.socket.recv_from(&mut buf)?;
            if from != self.server_addr {
                continue;
            }
            match Message::decode(&buf[..size]) {
                Ok(message) if message.transaction_id() == transaction_id => return Ok(message),
                Ok(_) => continue,
                // A garbled answer to our transaction is a failed binding.
                Err(e) if size >= 20 && buf[8..20] == transaction_id => return Err(e),
                Err(_) => continue,
            }
        }
    }

    /// Sends a Binding Request without waiting for its answer.
    ///
    /// Nothing is read back: the socket may be shared with a media reader,
    /// which is left to skip the responses.
    pub fn send_keepalive(&self) -> Result<(), StunError> {
        let request = MessageBuilder::new(MessageType::BINDING_REQUEST)
            .random_transaction_id()
            .build()?;
        self.socket.send_to(&request.encode(), self.server_addr)?;
        Ok(())
    }

    /// Tries each server name in turn and returns the first reflexive address.
    ///
    /// Names are resolved with DNS; every resolved address is tried.
    pub fn discover_reflexive_from_servers(
        bind_addr: SocketAddr,
        servers: &[String],
        timeout: Duration,
    ) -> Result<SocketAddr, StunError> {
        let mut last_error = StunError::SocketError("no STUN servers configured".to_string());

        for server in servers {
            let addrs = match server.to_socket_addrs() {
                Ok(addrs) => addrs,
                Err(e) => {
                    last_error = StunError::SocketError(format!("{}: {}", server, e));
                    continue;
                }
            };

            for server_addr in addrs {
                let result = StunClient::new(bind_addr, server_addr)
                    .map(|client| client.with_timeout(timeout))
                    .and_then(|client| client.get_reflexive_address());
                match result {
                    Ok(reflexive) => return Ok(reflexive),
                    Err(e) => last_error = e,
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttributeType;
    use std::thread;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    /// Answers a single request with whatever `respond` builds.
    fn one_shot_server<F>(respond: F) -> (SocketAddr, thread::JoinHandle<()>)
    where
        F: FnOnce(&Message, SocketAddr) -> Vec<Vec<u8>> + Send + 'static,
    {
        let socket = UdpSocket::bind(loopback()).unwrap();
        let addr = socket.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let mut buf = [0u8; 1500];
            let (size, from) = socket.recv_from(&mut buf).unwrap();
            let request = Message::decode(&buf[..size]).unwrap();
            for datagram in respond(&request, from) {
                socket.send_to(&datagram, from).unwrap();
            }
        });
        (addr, handle)
    }

    #[test]
    fn test_create_stun_client() {
        let client = StunClient::new(loopback(), "127.0.0.1:3478".parse().unwrap());
        assert!(client.is_ok());
    }

    #[test]
    fn test_get_reflexive_address() {
        let (server, handle) = one_shot_server(|request, from| {
            let mut response = Message::new(MessageType::BINDING_RESPONSE, request.transaction_id());
            response.add_xor_address(AttributeType::XorMappedAddress, from);
            vec![response.encode()]
        });

        let client = StunClient::new(loopback(), server).unwrap();
        let reflexive = client.get_reflexive_address().unwrap();
        assert_eq!(reflexive, client.local_addr().unwrap());
        handle.join().unwrap();
    }

    #[test]
    fn test_ignores_other_transactions() {
        let (server, handle) = one_shot_server(|request, from| {
            let mut stale = Message::new(MessageType::BINDING_RESPONSE, [0xAA; 12]);
            stale.add_xor_address(
                AttributeType::XorMappedAddress,
                "198.51.100.1:9".parse().unwrap(),
            );
            let mut response = Message::new(MessageType::BINDING_RESPONSE, request.transaction_id());
            response.add_xor_address(AttributeType::XorMappedAddress, from);
            vec![b"noise".to_vec(), stale.encode(), response.encode()]
        });

        let client = StunClient::new(loopback(), server).unwrap();
        assert_eq!(
            client.get_reflexive_address().unwrap(),
            client.local_addr().unwrap()
        );
        handle.join().unwrap();
    }

    #[test]
    fn test_error_response() {
        let (server, handle) = one_shot_server(|request, _| {
            let mut response = Message::new(MessageType::BINDING_ERROR, request.transaction_id());
            response.add_error_code(400, "Bad Request");
            vec![response.encode()]
        });

        let client = StunClient::new(loopback(), server).unwrap();
        assert_eq!(
            client.get_reflexive_address(),
            Err(StunError::ErrorResponse {
                code: 400,
                reason: "Bad Request".to_string()
            })
        );
        handle.join().unwrap();
    }

    #[test]
    fn test_response_without_mapped_address() {
        let (server, handle) = one_shot_server(|request, _| {
            vec![Message::new(MessageType::BINDING_RESPONSE, request.transaction_id()).encode()]
        });

        let client = StunClient::new(loopback(), server).unwrap();
        assert_eq!(
            client.get_reflexive_address(),
            Err(StunError::MissingAttribute("XOR-MAPPED-ADDRESS"))
        );
        handle.join().unwrap();
    }

    #[test]
    fn test_malformed_mapped_address() {
        let (server, handle) = one_shot_server(|request, _| {
            let mut response = Message::new(MessageType::BINDING_RESPONSE, request.transaction_id());
            response.add_attribute(AttributeType::XorMappedAddress, &[0x00, 0x07, 0x00, 0x01]);
            vec![response.encode()]
        });

        let client = StunClient::new(loopback(), server).unwrap();
        assert_eq!(
            client.get_reflexive_address(),
            Err(StunError::InvalidAddressFamily(0x07))
        );
        handle.join().unwrap();
    }

    #[test]
    fn test_timeout_on_silent_server() {
        let silent = UdpSocket::bind(loopback()).unwrap();
        let client = StunClient::new(loopback(), silent.local_addr().unwrap())
            .unwrap()
            .with_timeout(Duration::from_millis(150));

        let started = Instant::now();
        assert_eq!(client.get_reflexive_address(), Err(StunError::Timeout));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_send_keepalive_reaches_server() {
        let server = UdpSocket::bind(loopback()).unwrap();
        server
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let client = StunClient::new(loopback(), server.local_addr().unwrap()).unwrap();

        client.send_keepalive().unwrap();

        let mut buf = [0u8; 1500];
        let (size, _) = server.recv_from(&mut buf).unwrap();
        let request = Message::decode(&buf[..size]).unwrap();
        assert_eq!(request.message_type(), MessageType::BINDING_REQUEST);
    }

    #[test]
    fn test_keepalive_leaves_queued_datagrams_for_other_readers() {
        let server = UdpSocket::bind(loopback()).unwrap();
        let client = StunClient::new(loopback(), server.local_addr().unwrap()).unwrap();
        let media = client.try_clone_socket().unwrap();
        media
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        assert_eq!(media.local_addr().unwrap(), client.local_addr().unwrap());

        server
            .send_to(b"rtp", client.local_addr().unwrap())
            .unwrap();
        thread::sleep(Duration::from_millis(50));
        client.send_keepalive().unwrap();

        let mut buf = [0u8; 16];
        let (size, _) = media.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..size], b"rtp");
    }
}
