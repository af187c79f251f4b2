//! NAT mapping maintenance
//!
//! After a successful STUN discovery the mapping is refreshed by sending a
//! Binding Request every interval, for a bounded window measured from the
//! start of resolution. When the window closes the timer stops on its own;
//! there is no renewal.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use logging::Logger;
use stun::StunClient;

/// Why a keepalive timer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepaliveStop {
    /// The maintenance window closed
    WindowElapsed,
    /// The owner cancelled or dropped the timer
    Cancelled,
}

/// Summary returned when the timer thread ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepaliveReport {
    pub sent: u32,
    pub failures: u32,
    pub stop: KeepaliveStop,
}

/// Background keepalive task bound to one STUN client.
///
/// Cancelling is a message on a channel, so teardown never waits out a
/// full interval. Dropping the timer cancels it and joins the thread.
pub struct KeepaliveTimer {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<KeepaliveReport>>,
}

impl KeepaliveTimer {
    /// Moves `client` into a new thread that ticks every `interval` until
    /// `started + window`.
    pub fn start(
        client: StunClient,
        interval: Duration,
        window: Duration,
        started: Instant,
        logger: Logger,
    ) -> io::Result<Self> {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let deadline = started + window;

        let handle = thread::Builder::new()
            .name("stun-keepalive".to_string())
            .spawn(move || {
                logger.info(&format!(
                    "Keepalive started for {} (every {:?}, window {:?})",
                    client.server_addr(),
                    interval,
                    window
                ));

                let mut sent = 0;
                let mut failures = 0;
                let stop = loop {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        break KeepaliveStop::WindowElapsed;
                    }

                    match cancel_rx.recv_timeout(interval.min(remaining)) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                            break KeepaliveStop::Cancelled;
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                    }

                    // A tick landing on the deadline is not sent
                    if Instant::now() >= deadline {
                        break KeepaliveStop::WindowElapsed;
                    }

                    match client.send_keepalive() {
                        Ok(()) => {
                            sent += 1;
                            logger.debug(&format!("Keepalive {} sent", sent));
                        }
                        Err(e) => {
                            failures += 1;
                            logger.warn(&format!("Keepalive failed: {}", e));
                        }
                    }
                };

                logger.info(&format!(
                    "Keepalive stopped ({:?}): {} sent, {} failed",
                    stop, sent, failures
                ));
                KeepaliveReport {
                    sent,
                    failures,
                    stop,
                }
            })?;

        Ok(KeepaliveTimer {
            cancel: Some(cancel_tx),
            handle: Some(handle),
        })
    }

    /// True once the timer thread has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Cancels the timer and waits for its thread.
    ///
    /// Returns `None` if the thread panicked or was already joined.
    pub fn cancel(&mut self) -> Option<KeepaliveReport> {
        if let Some(cancel) = self.cancel.take() {
            // The thread may already be gone after the window closed
            let _ = cancel.send(());
        }
        self.handle.take().and_then(|h| h.join().ok())
    }

    /// Waits for the window to close without cancelling.
    pub fn join(mut self) -> Option<KeepaliveReport> {
        let report = self.handle.take().and_then(|h| h.join().ok());
        self.cancel = None;
        report
    }
}

impl Drop for KeepaliveTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logging::LogLevel;
    use std::net::{SocketAddr, UdpSocket};
    use tempfile::TempDir;

    fn setup() -> (TempDir, Logger, UdpSocket, StunClient) {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new(dir.path().join("test.log"), LogLevel::Debug).unwrap();
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let bind: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let client = StunClient::new(bind, server.local_addr().unwrap()).unwrap();
        (dir, logger, server, client)
    }

    fn count_datagrams(server: &UdpSocket) -> usize {
        server
            .set_read_timeout(Some(Duration::from_millis(100)))
            .unwrap();
        let mut buf = [0u8; 548];
        let mut count = 0;
        while server.recv_from(&mut buf).is_ok() {
            count += 1;
        }
        count
    }

    #[test]
    fn test_stops_when_window_elapses() {
        let (_dir, logger, server, client) = setup();
        let timer = KeepaliveTimer::start(
            client,
            Duration::from_millis(40),
            Duration::from_millis(150),
            Instant::now(),
            logger,
        )
        .unwrap();

        let report = timer.join().unwrap();
        assert_eq!(report.stop, KeepaliveStop::WindowElapsed);
        assert!(report.sent >= 1 && report.sent <= 3, "sent {}", report.sent);
        assert_eq!(count_datagrams(&server), report.sent as usize);
    }

    #[test]
    fn test_cancel_before_first_tick() {
        let (_dir, logger, server, client) = setup();
        let mut timer = KeepaliveTimer::start(
            client,
            Duration::from_secs(30),
            Duration::from_secs(120),
            Instant::now(),
            logger,
        )
        .unwrap();

        let started = Instant::now();
        let report = timer.cancel().unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(report.stop, KeepaliveStop::Cancelled);
        assert_eq!(report.sent, 0);
        assert!(timer.is_finished());
        assert_eq!(count_datagrams(&server), 0);
    }

    #[test]
    fn test_window_already_closed() {
        let (_dir, logger, _server, client) = setup();
        let started = Instant::now() - Duration::from_secs(5);
        let timer = KeepaliveTimer::start(
            client,
            Duration::from_millis(10),
            Duration::from_secs(1),
            started,
            logger,
        )
        .unwrap();

        let report = timer.join().unwrap();
        assert_eq!(report.stop, KeepaliveStop::WindowElapsed);
        assert_eq!(report.sent, 0);
    }

    #[test]
    fn test_drop_cancels() {
        let (_dir, logger, _server, client) = setup();
        let timer = KeepaliveTimer::start(
            client,
            Duration::from_secs(30),
            Duration::from_secs(120),
            Instant::now(),
            logger,
        )
        .unwrap();

        let started = Instant::now();
        drop(timer);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
