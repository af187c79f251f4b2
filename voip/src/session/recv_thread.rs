//! Receive duty of a media leg: read, parse, dispatch by payload type, play.

use std::collections::HashMap;

use logging::Logger;
use media::audio::registry::BoxedDecoder;
use media::{AudioSink, CodecRegistry, MediaError};
use network::{MAX_DATAGRAM_SIZE, MediaSocket, RtpPacket};
use stun::MessageHeader;

use super::config::MediaLoopConfig;
use super::termination::{LegTerminator, TerminationReason};
use crate::error::SessionError;

/// Parameters for the receive thread
pub(super) struct RecvThreadParams<'a, K> {
    pub socket: MediaSocket,
    pub sink: &'a mut K,
    pub registry: &'a CodecRegistry,
    /// Decoder of the negotiated codec, keyed by its payload type
    pub decoder: (u8, BoxedDecoder),
    pub config: &'a MediaLoopConfig,
    pub terminator: &'a LegTerminator,
    pub logger: Logger,
}

#[derive(Debug, Default)]
pub(super) struct RecvThreadState {
    pub packets_received: u64,
    pub frames_played: u64,
    pub dropped: u64,
    pub stun_skipped: u64,
}

/// What the loop does after one datagram.
enum Flow {
    Continue,
    Stop,
}

pub(super) fn run_recv_thread<K: AudioSink>(params: RecvThreadParams<'_, K>) -> RecvThreadState {
    let RecvThreadParams {
        mut socket,
        sink,
        registry,
        decoder,
        config,
        terminator,
        logger,
    } = params;

    logger.info(&format!(
        "RECV thread started on {}",
        socket
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown address".to_string())
    ));

    let mut decoders: HashMap<u8, BoxedDecoder> = HashMap::from([decoder]);
    let mut state = RecvThreadState::default();
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];

    while !terminator.is_terminated() {
        let len = match socket.recv(&mut buf) {
            Ok(Some((len, _))) => len,
            Ok(None) => continue,
            Err(e) => {
                logger.error(&format!("RECV thread terminating: {}", e));
                terminator.signal(TerminationReason::Failed(SessionError::Socket(e)));
                break;
            }
        };

        state.packets_received += 1;
        let flow = handle_datagram(
            &buf[..len],
            &mut decoders,
            registry,
            sink,
            &mut state,
            &logger,
            terminator,
        );
        if let Flow::Stop = flow {
            break;
        }

        if state.packets_received.is_multiple_of(config.stats_interval) {
            log_stats(&logger, &state);
        }
    }

    logger.info(&format!(
        "RECV thread stopped: {} received, {} played, {} dropped, {} STUN skipped",
        state.packets_received, state.frames_played, state.dropped, state.stun_skipped
    ));
    state
}

fn handle_datagram<K: AudioSink>(
    datagram: &[u8],
    decoders: &mut HashMap<u8, BoxedDecoder>,
    registry: &CodecRegistry,
    sink: &mut K,
    state: &mut RecvThreadState,
    logger: &Logger,
    terminator: &LegTerminator,
) -> Flow {
    // Binding responses to keepalives share the socket
    if MessageHeader::is_stun(datagram) {
        state.stun_skipped += 1;
        logger.debug("Skipping STUN datagram");
        return Flow::Continue;
    }

    let packet = match RtpPacket::from_bytes(datagram) {
        Ok(packet) => packet,
        Err(e) => {
            drop_packet(state, logger, &format!("parse error: {}", e));
            return Flow::Continue;
        }
    };

    let payload_type = packet.header.payload_type;
    let decoder = match decoder_for(decoders, registry, payload_type, logger) {
        Ok(decoder) => decoder,
        Err(e) => {
            drop_packet(state, logger, &e.to_string());
            return Flow::Continue;
        }
    };

    let frame = match decoder.decode(&packet.payload) {
        Ok(Some(frame)) => frame,
        Ok(None) => return Flow::Continue,
        Err(e) => {
            drop_packet(
                state,
                logger,
                &format!("decode error (seq {}): {}", packet.header.sequence_number, e),
            );
            return Flow::Continue;
        }
    };

    match sink.write_frame(&frame.samples) {
        Ok(()) => {
            state.frames_played += 1;
            Flow::Continue
        }
        Err(MediaError::StreamClosed) => {
            logger.error("RECV thread terminating: playback stream closed");
            terminator.signal(TerminationReason::Failed(SessionError::Playback(
                MediaError::StreamClosed,
            )));
            Flow::Stop
        }
        Err(e) => {
            logger.warn(&format!("Playback write failed: {}", e));
            Flow::Continue
        }
    }
}

/// Decoder for `payload_type`, created on first use for codecs other than
/// the negotiated one.
fn decoder_for<'d>(
    decoders: &'d mut HashMap<u8, BoxedDecoder>,
    registry: &CodecRegistry,
    payload_type: u8,
    logger: &Logger,
) -> Result<&'d mut BoxedDecoder, MediaError> {
    if !decoders.contains_key(&payload_type) {
        let factory = registry.by_payload_type(payload_type)?;
        logger.info(&format!(
            "Creating {} decoder for payload type {}",
            factory.name, payload_type
        ));
        decoders.insert(payload_type, factory.decoder(logger)?);
    }
    decoders
        .get_mut(&payload_type)
        .ok_or(MediaError::UnsupportedPayloadType(payload_type))
}

fn drop_packet(state: &mut RecvThreadState, logger: &Logger, reason: &str) {
    state.dropped += 1;
    logger.warn(&format!("Dropping packet: {}", reason));
}

fn log_stats(logger: &Logger, state: &RecvThreadState) {
    logger.debug(&format!(
        "RECV: {} packets, {} frames played, {} dropped",
        state.packets_received, state.frames_played, state.dropped
    ));
}
