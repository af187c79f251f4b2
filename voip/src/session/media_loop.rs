//! One call leg of real-time audio over RTP.
//!
//! A [`MediaLoop`] owns the media socket of the leg and runs two duties on
//! their own threads: the send duty (capture, encode, packetize, pace) and
//! the receive duty (read, parse, decode, play). Either duty ending ends
//! the leg. Codec handles live inside the duty that uses them, so they are
//! released when that thread returns, whatever the reason.

use std::thread::{self, JoinHandle};

use logging::Logger;
use media::{AudioSink, AudioSource, CodecRegistry};
use network::MediaSocket;

use super::config::MediaLoopConfig;
use super::recv_thread::{RecvThreadParams, RecvThreadState, run_recv_thread};
use super::send_thread::{SendThreadParams, SendThreadState, run_send_thread};
use super::termination::{LegTerminator, TerminationReason};
use crate::error::SessionError;

type TerminationCallback = Box<dyn FnOnce(&TerminationReason) + Send>;

/// How a leg ended, with its packet counters.
#[derive(Debug)]
pub struct LegOutcome {
    pub reason: TerminationReason,
    pub sent: u64,
    pub received: u64,
    pub dropped: u64,
}

pub struct MediaLoop<S, K> {
    socket: MediaSocket,
    codec: String,
    source: S,
    sink: K,
    config: MediaLoopConfig,
    registry: CodecRegistry,
    terminator: LegTerminator,
    on_terminated: Option<TerminationCallback>,
    logger: Logger,
}

impl<S, K> MediaLoop<S, K>
where
    S: AudioSource + Send,
    K: AudioSink + Send,
{
    /// Prepares a leg sending `codec` to the socket's remote address.
    pub fn new(
        socket: MediaSocket,
        codec: &str,
        source: S,
        sink: K,
        config: MediaLoopConfig,
        logger: &Logger,
    ) -> Self {
        MediaLoop {
            socket,
            codec: codec.to_string(),
            source,
            sink,
            config,
            registry: CodecRegistry::default(),
            terminator: LegTerminator::new(),
            on_terminated: None,
            logger: logger.for_component("MediaLoop"),
        }
    }

    /// Replaces the default PCMU/Opus registry.
    pub fn with_registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Called once with the termination reason after both duties stopped.
    pub fn on_terminated<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&TerminationReason) + Send + 'static,
    {
        self.on_terminated = Some(Box::new(callback));
        self
    }

    /// Handle for ending the leg from another thread.
    pub fn terminator(&self) -> LegTerminator {
        self.terminator.clone()
    }

    /// Runs both duties and blocks until the leg ends.
    ///
    /// Setup failures (unknown codec, codec handle creation, socket clone)
    /// end the leg before any packet is sent and are reported the same way
    /// as failures of a running duty.
    pub fn run(self) -> LegOutcome {
        let MediaLoop {
            socket,
            codec,
            mut source,
            mut sink,
            config,
            registry,
            terminator,
            on_terminated,
            logger,
        } = self;

        let (sent, received) = match prepare(socket, &codec, &registry, &logger) {
            Ok(prepared) => run_duties(
                prepared,
                &mut source,
                &mut sink,
                &config,
                &registry,
                &terminator,
                &logger,
            ),
            Err(e) => {
                logger.error(&format!("Media leg setup failed: {}", e));
                terminator.signal(TerminationReason::Failed(e));
                (SendThreadState::default(), RecvThreadState::default())
            }
        };

        let reason = terminator.take_reason();
        logger.info(&format!(
            "Media leg ended ({}): {} sent, {} received, {} dropped",
            reason, sent.packets_sent, received.packets_received, received.dropped
        ));
        if let Some(callback) = on_terminated {
            callback(&reason);
        }

        LegOutcome {
            reason,
            sent: sent.packets_sent,
            received: received.packets_received,
            dropped: received.dropped,
        }
    }
}

impl<S, K> MediaLoop<S, K>
where
    S: AudioSource + Send + 'static,
    K: AudioSink + Send + 'static,
{
    /// Runs the leg on a background thread.
    pub fn spawn(self) -> Result<LegHandle, SessionError> {
        let terminator = self.terminator();
        let thread = thread::Builder::new()
            .name("media-loop".to_string())
            .spawn(move || self.run())
            .map_err(|e| SessionError::Thread(e.to_string()))?;

        Ok(LegHandle { terminator, thread })
    }
}

/// A running leg started with [`MediaLoop::spawn`].
pub struct LegHandle {
    terminator: LegTerminator,
    thread: JoinHandle<LegOutcome>,
}

impl LegHandle {
    /// Ends the leg. Returns false if it had already ended.
    pub fn terminate(&self) -> bool {
        self.terminator.signal(TerminationReason::Requested)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for both duties to stop.
    pub fn join(self) -> Result<LegOutcome, SessionError> {
        self.thread
            .join()
            .map_err(|_| SessionError::Thread("media loop thread panicked".to_string()))
    }
}

/// Per-direction resources acquired before the duties start.
struct Prepared {
    send_socket: MediaSocket,
    recv_socket: MediaSocket,
    encoder: media::audio::registry::BoxedEncoder,
    decoder: media::audio::registry::BoxedDecoder,
    payload_type: u8,
}

fn prepare(
    socket: MediaSocket,
    codec: &str,
    registry: &CodecRegistry,
    logger: &Logger,
) -> Result<Prepared, SessionError> {
    let factory = registry
        .by_name(codec)
        .map_err(|_| SessionError::UnsupportedCodec(codec.to_string()))?;
    let encoder = factory
        .encoder(logger)
        .map_err(SessionError::EncoderLifecycle)?;
    let decoder = factory
        .decoder(logger)
        .map_err(SessionError::EncoderLifecycle)?;

    let recv_socket = socket.try_clone().map_err(SessionError::Socket)?;

    logger.info(&format!(
        "Starting media leg {} -> {} ({}/{})",
        socket
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "?".to_string()),
        socket.remote_addr(),
        factory.name,
        factory.payload_type
    ));

    Ok(Prepared {
        send_socket: socket,
        recv_socket,
        encoder,
        decoder,
        payload_type: factory.payload_type,
    })
}

fn run_duties<S, K>(
    prepared: Prepared,
    source: &mut S,
    sink: &mut K,
    config: &MediaLoopConfig,
    registry: &CodecRegistry,
    terminator: &LegTerminator,
    logger: &Logger,
) -> (SendThreadState, RecvThreadState)
where
    S: AudioSource + Send,
    K: AudioSink + Send,
{
    let Prepared {
        send_socket,
        recv_socket,
        encoder,
        decoder,
        payload_type,
    } = prepared;

    if let Err(e) = recv_socket.set_read_timeout(Some(config.poll_interval)) {
        terminator.signal(TerminationReason::Failed(SessionError::Socket(e)));
        return (SendThreadState::default(), RecvThreadState::default());
    }

    let send_params = SendThreadParams {
        socket: send_socket,
        source,
        encoder,
        payload_type,
        config,
        terminator,
        logger: logger.for_component("Send"),
    };
    let recv_params = RecvThreadParams {
        socket: recv_socket,
        sink,
        registry,
        decoder: (payload_type, decoder),
        config,
        terminator,
        logger: logger.for_component("Recv"),
    };

    thread::scope(|scope| {
        let send = spawn_duty(scope, "media-send", terminator, move || {
            run_send_thread(send_params)
        });
        let recv = spawn_duty(scope, "media-recv", terminator, move || {
            run_recv_thread(recv_params)
        });

        (join_duty(send), join_duty(recv))
    })
}

/// Signals the leg if a duty thread unwinds, so its sibling stops too.
struct PanicGuard<'a> {
    name: &'static str,
    terminator: &'a LegTerminator,
}

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.terminator
                .signal(TerminationReason::Failed(SessionError::Thread(format!(
                    "{} panicked",
                    self.name
                ))));
        }
    }
}

fn spawn_duty<'scope, T, F>(
    scope: &'scope thread::Scope<'scope, '_>,
    name: &'static str,
    terminator: &'scope LegTerminator,
    duty: F,
) -> Option<thread::ScopedJoinHandle<'scope, T>>
where
    F: FnOnce() -> T + Send + 'scope,
    T: Send + 'scope,
{
    let spawned = thread::Builder::new()
        .name(name.to_string())
        .spawn_scoped(scope, move || {
            let _guard = PanicGuard { name, terminator };
            duty()
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            terminator.signal(TerminationReason::Failed(SessionError::Thread(format!(
                "cannot start {}: {}",
                name, e
            ))));
            None
        }
    }
}

fn join_duty<T: Default>(handle: Option<thread::ScopedJoinHandle<'_, T>>) -> T {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
