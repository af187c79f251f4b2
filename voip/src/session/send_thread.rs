//! Send duty of a media leg: capture, encode, packetize, pace.

use std::thread;
use std::time::{Duration, Instant};

use logging::Logger;
use media::audio::registry::BoxedEncoder;
use media::{AudioFrame, AudioSource, MediaError};
use network::{MediaSocket, RtpHeader, RtpPacket};

use super::config::MediaLoopConfig;
use super::termination::{LegTerminator, TerminationReason};
use crate::error::SessionError;

/// Parameters for the send thread
pub(super) struct SendThreadParams<'a, S> {
    pub socket: MediaSocket,
    pub source: &'a mut S,
    pub encoder: BoxedEncoder,
    pub payload_type: u8,
    pub config: &'a MediaLoopConfig,
    pub terminator: &'a LegTerminator,
    pub logger: Logger,
}

/// Counters owned by the send duty. Sequence number and timestamp are
/// never touched by any other thread.
#[derive(Debug, Default)]
pub(super) struct SendThreadState {
    pub sequence_number: u16,
    pub timestamp: u32,
    pub packets_sent: u64,
    pub frames_buffered: u64,
}

impl SendThreadState {
    /// Header for the next packet; advances the counters.
    fn next_header(&mut self, payload_type: u8, ssrc: u32, frame_samples: u32) -> RtpHeader {
        let mut header = RtpHeader::new(payload_type, ssrc);
        header.sequence_number = self.sequence_number;
        header.timestamp = self.timestamp;

        self.sequence_number = self.sequence_number.wrapping_add(1);
        self.timestamp = self.timestamp.wrapping_add(frame_samples);
        header
    }
}

pub(super) fn run_send_thread<S: AudioSource>(mut params: SendThreadParams<'_, S>) -> SendThreadState {
    params.logger.info(&format!(
        "SEND thread started ({}, payload type {})",
        params.encoder.get_codec(),
        params.payload_type
    ));

    let mut state = SendThreadState::default();
    let interval = params.config.frame_interval;
    let mut next_tick = Instant::now() + interval;

    while !params.terminator.is_terminated() {
        let samples = match params.source.read_frame(params.config.frame_samples) {
            Ok(Some(samples)) => samples,
            Ok(None) => continue,
            Err(MediaError::StreamClosed) => {
                params.logger.info("Capture stream ended");
                params.terminator.signal(TerminationReason::CaptureEnded);
                break;
            }
            Err(e) => {
                fail(&params, SessionError::Capture(e));
                break;
            }
        };

        if let Err(e) = send_frame(&mut params, &mut state, samples) {
            fail(&params, e);
            break;
        }

        pace(&mut next_tick, interval, params.terminator);
    }

    params.logger.info(&format!(
        "SEND thread stopped: {} packets sent, {} frames held by the encoder, next sequence number {}",
        state.packets_sent, state.frames_buffered, state.sequence_number
    ));
    state
}

fn send_frame<S>(
    params: &mut SendThreadParams<'_, S>,
    state: &mut SendThreadState,
    samples: Vec<i16>,
) -> Result<(), SessionError> {
    let payload = params
        .encoder
        .encode(&AudioFrame::telephony(samples))
        .map_err(SessionError::Encode)?;

    // The encoder is still buffering; nothing goes on the wire
    if payload.is_empty() {
        state.frames_buffered += 1;
        return Ok(());
    }

    let header = state.next_header(
        params.payload_type,
        params.config.ssrc,
        params.config.frame_samples as u32,
    );
    let bytes = RtpPacket::new(header, payload)
        .to_bytes()
        .map_err(SessionError::Packet)?;
    params.socket.send(&bytes).map_err(SessionError::Socket)?;

    state.packets_sent += 1;
    if state.packets_sent.is_multiple_of(params.config.stats_interval) {
        params
            .logger
            .debug(&format!("SEND: {} packets", state.packets_sent));
    }
    Ok(())
}

/// Sleeps until `next_tick`, waking early if the leg ends.
///
/// A sender that fell more than one interval behind restarts its schedule
/// instead of bursting.
fn pace(next_tick: &mut Instant, interval: Duration, terminator: &LegTerminator) {
    const SLICE: Duration = Duration::from_millis(5);

    loop {
        let now = Instant::now();
        if now >= *next_tick || terminator.is_terminated() {
            break;
        }
        thread::sleep((*next_tick - now).min(SLICE));
    }

    *next_tick += interval;
    let now = Instant::now();
    if now > *next_tick {
        *next_tick = now + interval;
    }
}

fn fail<S>(params: &SendThreadParams<'_, S>, error: SessionError) {
    params
        .logger
        .error(&format!("SEND thread terminating: {}", error));
    params.terminator.signal(TerminationReason::Failed(error));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_increment_by_one_and_frame_size() {
        let mut state = SendThreadState::default();
        for i in 0..5u16 {
            let header = state.next_header(0, 1234, 160);
            assert_eq!(header.sequence_number, i);
            assert_eq!(header.timestamp, u32::from(i) * 160);
            assert_eq!(header.ssrc, 1234);
        }
    }

    #[test]
    fn test_counters_wrap() {
        let mut state = SendThreadState {
            sequence_number: u16::MAX,
            timestamp: u32::MAX - 100,
            ..Default::default()
        };

        let last = state.next_header(96, 1, 160);
        assert_eq!(last.sequence_number, u16::MAX);
        let wrapped = state.next_header(96, 1, 160);
        assert_eq!(wrapped.sequence_number, 0);
        assert_eq!(wrapped.timestamp, 59);
    }

    #[test]
    fn test_pace_restarts_schedule_when_behind() {
        let terminator = LegTerminator::new();
        let interval = Duration::from_millis(20);
        let mut next_tick = Instant::now() - Duration::from_secs(1);

        pace(&mut next_tick, interval, &terminator);
        assert!(next_tick > Instant::now());
    }

    #[test]
    fn test_pace_returns_early_when_terminated() {
        let terminator = LegTerminator::new();
        terminator.signal(TerminationReason::Requested);
        let mut next_tick = Instant::now() + Duration::from_secs(10);

        let started = Instant::now();
        pace(&mut next_tick, Duration::from_secs(10), &terminator);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
