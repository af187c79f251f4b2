//! Session description text for a resolved candidate.
//!
//! Rendering is a pure function of the candidate and the announced codecs:
//! no clock, no random session id.

use media::CodecRegistry;
use sdp::{Connection, MediaDescription, Origin, RtpMap, SdpError, SessionDescription};

use crate::transport::TransportCandidate;

/// Payload types below this have a static RTP/AVP mapping and need no rtpmap.
const FIRST_DYNAMIC_PAYLOAD_TYPE: u8 = 96;

/// One codec offered on the audio media line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecAnnouncement {
    pub name: String,
    pub payload_type: u8,
    pub clock_rate: u32,
    pub channels: Option<u8>,
}

impl CodecAnnouncement {
    pub fn pcmu() -> Self {
        CodecAnnouncement {
            name: "PCMU".to_string(),
            payload_type: 0,
            clock_rate: 8000,
            channels: None,
        }
    }

    pub fn opus() -> Self {
        CodecAnnouncement {
            name: "opus".to_string(),
            payload_type: 96,
            clock_rate: 8000,
            channels: Some(1),
        }
    }

    /// PCMU then Opus.
    pub fn default_set() -> Vec<CodecAnnouncement> {
        vec![Self::pcmu(), Self::opus()]
    }

    /// Every codec in `registry`, ordered by payload type.
    pub fn from_registry(registry: &CodecRegistry) -> Vec<CodecAnnouncement> {
        registry
            .codecs()
            .map(|factory| CodecAnnouncement {
                name: factory.name.to_string(),
                payload_type: factory.payload_type,
                clock_rate: factory.clock_rate,
                channels: Some(factory.channels),
            })
            .collect()
    }

    fn rtpmap(&self) -> Option<RtpMap> {
        (self.payload_type >= FIRST_DYNAMIC_PAYLOAD_TYPE).then(|| RtpMap {
            payload_type: self.payload_type,
            encoding: self.name.clone(),
            clock_rate: self.clock_rate,
            channels: self.channels,
        })
    }
}

/// Renders the description announcing `codecs` at `candidate`.
///
/// # Errors
/// `SdpError::NoMediaFormats` when `codecs` is empty.
pub fn build(candidate: &TransportCandidate, codecs: &[CodecAnnouncement]) -> Result<String, SdpError> {
    let ip = candidate.ip();

    let mut audio = MediaDescription::audio(candidate.port());
    for codec in codecs {
        audio.add_format(codec.payload_type, codec.rtpmap());
    }

    let description = SessionDescription::builder(Origin::anonymous(ip))
        .connection(Connection::new(ip))
        .add_media(audio)
        .build()?;

    Ok(description.to_string())
}

/// Name of the first codec on the first audio line of `text`.
pub fn negotiated_codec(text: &str) -> Result<String, SdpError> {
    let description = SessionDescription::parse(text)?;
    let audio = description
        .media_of_type("audio")
        .ok_or(SdpError::NoMediaSections)?;

    let first = audio.formats.first().ok_or(SdpError::NoMediaFormats)?;
    let payload_type: u8 = first.parse().map_err(|_| SdpError::InvalidMediaFormat)?;

    audio
        .mapping_for(payload_type)
        .map(|map| map.encoding)
        .ok_or_else(|| SdpError::InvalidRtpMap(format!("no mapping for payload type {}", payload_type)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::CandidateKind;

    fn candidate(kind: CandidateKind, addr: &str) -> TransportCandidate {
        TransportCandidate::new(kind, addr.parse().unwrap())
    }

    #[test]
    fn test_build_matches_template() {
        let text = build(
            &candidate(CandidateKind::ServerReflexive, "198.51.100.20:5004"),
            &CodecAnnouncement::default_set(),
        )
        .unwrap();

        assert_eq!(
            text,
            "v=0\r\n\
             o=- 0 0 IN IP4 198.51.100.20\r\n\
             s=-\r\n\
             c=IN IP4 198.51.100.20\r\n\
             t=0 0\r\n\
             m=audio 5004 RTP/AVP 0 96\r\n\
             a=rtpmap:96 opus/8000/1\r\n"
        );
    }

    #[test]
    fn test_relay_candidate_uses_relay_address() {
        let text = build(
            &candidate(CandidateKind::Relay, "192.0.2.44:49170"),
            &CodecAnnouncement::default_set(),
        )
        .unwrap();
        assert!(text.contains("c=IN IP4 192.0.2.44\r\n"));
        assert!(text.contains("m=audio 49170 RTP/AVP 0 96\r\n"));
    }

    #[test]
    fn test_ipv6_candidate() {
        let text = build(
            &candidate(CandidateKind::Host, "[2001:db8::1]:6000"),
            &[CodecAnnouncement::pcmu()],
        )
        .unwrap();
        assert!(text.contains("c=IN IP6 2001:db8::1\r\n"));
        assert!(text.contains("m=audio 6000 RTP/AVP 0\r\n"));
        assert!(!text.contains("a=rtpmap"));
    }

    #[test]
    fn test_build_without_codecs_fails() {
        let result = build(&candidate(CandidateKind::Host, "127.0.0.1:4000"), &[]);
        assert_eq!(result, Err(SdpError::NoMediaFormats));
    }

    #[test]
    fn test_announcements_from_default_registry() {
        let announced = CodecAnnouncement::from_registry(&CodecRegistry::default());
        assert_eq!(announced.len(), 2);
        assert_eq!(announced[0].payload_type, 0);
        assert_eq!(announced[1].name, "opus");
        assert_eq!(announced[1].payload_type, 96);
    }

    #[test]
    fn test_negotiated_codec() {
        let local = build(
            &candidate(CandidateKind::Host, "10.0.0.1:4000"),
            &CodecAnnouncement::default_set(),
        )
        .unwrap();
        assert_eq!(negotiated_codec(&local).unwrap(), "PCMU");

        let remote = "v=0\r\no=- 1 1 IN IP4 10.0.0.2\r\ns=-\r\nt=0 0\r\n\
                      m=audio 4002 RTP/AVP 96 0\r\na=rtpmap:96 opus/8000/1\r\n";
        assert_eq!(negotiated_codec(remote).unwrap(), "opus");
    }

    #[test]
    fn test_negotiated_codec_unknown_payload_type() {
        let remote = "v=0\r\no=- 1 1 IN IP4 10.0.0.2\r\ns=-\r\nt=0 0\r\nm=audio 4002 RTP/AVP 101\r\n";
        assert!(matches!(
            negotiated_codec(remote),
            Err(SdpError::InvalidRtpMap(_))
        ));
    }
}
