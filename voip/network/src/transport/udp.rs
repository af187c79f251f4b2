//! UDP socket for sending and receiving RTP datagrams of one call leg

use crate::error::{NetworkError, Result};
use logging::Logger;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

/// Datagram endpoint bound locally and aimed at one remote peer.
///
/// Blocking by design: `recv` waits up to the configured read timeout and
/// reports `Ok(None)` when it expires, so a reader can poll a stop flag.
pub struct MediaSocket {
    socket: UdpSocket,
    remote_addr: SocketAddr,
    logger: Logger,
    bytes_sent: u64,
    bytes_received: u64,
}

impl MediaSocket {
    /// Binds `bind_addr` and targets `remote_addr`.
    pub fn bind(bind_addr: SocketAddr, remote_addr: SocketAddr, logger: Logger) -> Result<Self> {
        let socket = UdpSocket::bind(bind_addr)?;
        logger.info(&format!(
            "Media socket bound at {} for peer {}",
            socket.local_addr()?,
            remote_addr
        ));
        Ok(Self::from_socket(socket, remote_addr, logger))
    }

    /// Wraps an already bound socket.
    pub fn from_socket(socket: UdpSocket, remote_addr: SocketAddr, logger: Logger) -> Self {
        MediaSocket {
            socket,
            remote_addr,
            logger,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// `None` blocks reads indefinitely.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_read_timeout(timeout)?;
        Ok(())
    }

    /// Second handle on the same socket, for a reader on another thread.
    /// The descriptor is closed when the last handle is dropped.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(MediaSocket {
            socket: self.socket.try_clone()?,
            remote_addr: self.remote_addr,
            logger: self.logger.clone(),
            bytes_sent: 0,
            bytes_received: 0,
        })
    }

    /// Sends one datagram to the remote peer.
    pub fn send(&mut self, data: &[u8]) -> Result<usize> {
        let sent = self.socket.send_to(data, self.remote_addr)?;
        self.update_send_stats(sent);
        Ok(sent)
    }

    fn update_send_stats(&mut self, sent: usize) {
        self.bytes_sent += sent as u64;
        if self.bytes_sent % 100_000 < sent as u64 {
            self.logger
                .debug(&format!("Total bytes sent: {}", self.bytes_sent));
        }
    }

    /// Receives one datagram into `buf`.
    ///
    /// # Returns
    /// * `Ok(Some((len, addr)))` - Datagram length and sender
    /// * `Ok(None)` - Read timeout expired
    /// * `Err` - Socket failure
    pub fn recv(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>> {
        match self.socket.recv_from(buf) {
            Ok((size, addr)) => {
                self.update_receive_stats(size);
                Ok(Some((size, addr)))
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(e) if e.kind() == ErrorKind::ConnectionReset => {
                // ICMP port unreachable surfaces as a reset on some platforms
                self.logger
                    .debug(&format!("Ignoring connection reset: {}", e));
                Ok(None)
            }
            Err(e) if e.kind() == ErrorKind::NotConnected => Err(NetworkError::Closed),
            Err(e) => Err(NetworkError::Network(e)),
        }
    }

    fn update_receive_stats(&mut self, size: usize) {
        self.bytes_received += size as u64;
        if self.bytes_received % 100_000 < size as u64 {
            self.logger
                .debug(&format!("Total bytes received: {}", self.bytes_received));
        }
    }

    /// Returns (bytes_sent, bytes_received) through this handle.
    pub fn stats(&self) -> (u64, u64) {
        (self.bytes_sent, self.bytes_received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logging::LogLevel;
    use tempfile::TempDir;

    fn create_test_logger(dir: &TempDir) -> Logger {
        Logger::new(dir.path().join("test.log"), LogLevel::Debug).unwrap()
    }

    fn localhost() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[test]
    fn test_media_socket_send_receive() {
        let dir = TempDir::new().unwrap();
        let peer = UdpSocket::bind(localhost()).unwrap();
        let peer_addr = peer.local_addr().unwrap();

        let mut socket =
            MediaSocket::bind(localhost(), peer_addr, create_test_logger(&dir)).unwrap();
        let local = socket.local_addr().unwrap();

        let sent = socket.send(&[10, 20, 30]).unwrap();
        assert_eq!(sent, 3);

        let mut buf = [0u8; 16];
        let (len, from) = peer.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], &[10, 20, 30]);
        assert_eq!(from, local);

        peer.send_to(&[1, 2], local).unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let (len, from) = socket.recv(&mut buf).unwrap().unwrap();
        assert_eq!(&buf[..len], &[1, 2]);
        assert_eq!(from, peer_addr);

        assert_eq!(socket.stats(), (3, 2));
    }

    #[test]
    fn test_media_socket_recv_timeout_is_none() {
        let dir = TempDir::new().unwrap();
        let remote: SocketAddr = "127.0.0.1:9".parse().unwrap();
        let mut socket = MediaSocket::bind(localhost(), remote, create_test_logger(&dir)).unwrap();
        socket
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();

        let mut buf = [0u8; 16];
        assert!(socket.recv(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_media_socket_clone_shares_port() {
        let dir = TempDir::new().unwrap();
        let remote: SocketAddr = "127.0.0.1:9".parse().unwrap();
        let socket = MediaSocket::bind(localhost(), remote, create_test_logger(&dir)).unwrap();
        let clone = socket.try_clone().unwrap();

        assert_eq!(socket.local_addr().unwrap(), clone.local_addr().unwrap());
        assert_eq!(clone.remote_addr(), remote);
        assert_eq!(clone.stats(), (0, 0));
    }
}
