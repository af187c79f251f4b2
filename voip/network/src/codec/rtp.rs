//! RTP packet structure and serialization
//!
//! Implements the fixed header of RFC 3550 section 5.1. Header extensions
//! and padding are not supported and are rejected on parse.
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |V=2|P|X|  CC   |M|     PT      |       Sequence Number         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           Timestamp                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           SSRC (Synchronization Source)                       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |            CSRC list (CC entries, 0-15)                       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use crate::error::{NetworkError, Result};

/// Largest datagram a media leg sends or reads.
pub const MAX_DATAGRAM_SIZE: usize = 1500;

const RTP_VERSION: u8 = 2;
const MAX_CSRCS: usize = 15;

fn parse_u16_be(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

fn parse_u32_be(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// RTP packet header. The version is always 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpHeader {
    /// Marker bit (interpretation depends on payload type)
    pub marker: bool,
    /// Payload type (0-127)
    pub payload_type: u8,
    /// Wraps at 2^16
    pub sequence_number: u16,
    /// Sampling instant of the first payload octet; wraps at 2^32
    pub timestamp: u32,
    /// Synchronization source identifier
    pub ssrc: u32,
    /// Contributing sources (at most 15)
    pub csrcs: Vec<u32>,
}

impl RtpHeader {
    /// Size of the fixed part of the header in bytes.
    pub const SIZE: usize = 12;

    /// Header with zero sequence number and timestamp.
    pub fn new(payload_type: u8, ssrc: u32) -> Self {
        RtpHeader {
            marker: false,
            payload_type,
            sequence_number: 0,
            timestamp: 0,
            ssrc,
            csrcs: Vec::new(),
        }
    }

    /// Encoded length including the CSRC list.
    pub fn encoded_len(&self) -> usize {
        Self::SIZE + self.csrcs.len() * 4
    }

    fn write_to(&self, bytes: &mut Vec<u8>) -> Result<()> {
        if self.payload_type > 0x7F {
            return Err(NetworkError::Rtp(format!(
                "Payload type {} out of range",
                self.payload_type
            )));
        }
        if self.csrcs.len() > MAX_CSRCS {
            return Err(NetworkError::Rtp(format!(
                "Too many CSRCs: {}",
                self.csrcs.len()
            )));
        }

        // V(2) P(1)=0 X(1)=0 CC(4)
        bytes.push((RTP_VERSION << 6) | self.csrcs.len() as u8);
        // M(1) PT(7)
        bytes.push(((self.marker as u8) << 7) | self.payload_type);
        bytes.extend_from_slice(&self.sequence_number.to_be_bytes());
        bytes.extend_from_slice(&self.timestamp.to_be_bytes());
        bytes.extend_from_slice(&self.ssrc.to_be_bytes());
        for csrc in &self.csrcs {
            bytes.extend_from_slice(&csrc.to_be_bytes());
        }
        Ok(())
    }

    /// Parses a header from the start of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(NetworkError::Rtp(format!(
                "Header too short: {} bytes",
                data.len()
            )));
        }

        let version = data[0] >> 6;
        if version != RTP_VERSION {
            return Err(NetworkError::Rtp(format!("Unsupported version {}", version)));
        }
        if data[0] & 0x20 != 0 {
            return Err(NetworkError::Rtp("Padding not supported".to_string()));
        }
        if data[0] & 0x10 != 0 {
            return Err(NetworkError::Rtp(
                "Header extensions not supported".to_string(),
            ));
        }

        let csrc_count = (data[0] & 0x0F) as usize;
        let header_len = Self::SIZE + csrc_count * 4;
        if data.len() < header_len {
            return Err(NetworkError::Rtp(format!(
                "CSRC list truncated: {} of {} bytes",
                data.len(),
                header_len
            )));
        }

        Ok(RtpHeader {
            marker: data[1] & 0x80 != 0,
            payload_type: data[1] & 0x7F,
            sequence_number: parse_u16_be(data, 2),
            timestamp: parse_u32_be(data, 4),
            ssrc: parse_u32_be(data, 8),
            csrcs: (0..csrc_count)
                .map(|i| parse_u32_be(data, Self::SIZE + i * 4))
                .collect(),
        })
    }
}

/// Complete RTP Packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpPacket {
    pub header: RtpHeader,
    pub payload: Vec<u8>,
}

impl RtpPacket {
    pub fn new(header: RtpHeader, payload: Vec<u8>) -> Self {
        RtpPacket { header, payload }
    }

    /// Serializes the packet; fails when it would not fit in one datagram.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let total = self.header.encoded_len() + self.payload.len();
        if total > MAX_DATAGRAM_SIZE {
            return Err(NetworkError::PayloadTooLarge {
                size: self.payload.len(),
                max: MAX_DATAGRAM_SIZE - self.header.encoded_len(),
            });
        }

        let mut bytes = Vec::with_capacity(total);
        self.header.write_to(&mut bytes)?;
        bytes.extend_from_slice(&self.payload);
        Ok(bytes)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = RtpHeader::from_bytes(data)?;
        let payload = data[header.encoded_len()..].to_vec();
        Ok(RtpPacket { header, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_packet() -> RtpPacket {
        let mut header = RtpHeader::new(0, 1234);
        header.sequence_number = 999;
        header.timestamp = 159_840;
        header.marker = true;
        RtpPacket::new(header, vec![0xFF; 160])
    }

    #[test]
    fn test_rtp_header_layout() {
        let mut header = RtpHeader::new(96, 0x0102_0304);
        header.sequence_number = 0xABCD;
        header.timestamp = 0x1122_3344;
        header.marker = true;

        let bytes = RtpPacket::new(header, vec![]).to_bytes().unwrap();
        assert_eq!(
            bytes,
            vec![
                0x80, 0xE0, 0xAB, 0xCD, 0x11, 0x22, 0x33, 0x44, 0x01, 0x02, 0x03, 0x04
            ]
        );
    }

    #[test]
    fn test_rtp_packet_roundtrip() {
        let packet = sample_packet();
        let bytes = packet.to_bytes().unwrap();
        assert_eq!(bytes.len(), RtpHeader::SIZE + 160);
        assert_eq!(RtpPacket::from_bytes(&bytes).unwrap(), packet);
    }

    #[test]
    fn test_rtp_packet_roundtrip_with_csrcs() {
        let mut packet = sample_packet();
        packet.header.csrcs = vec![7, 8, 9];

        let bytes = packet.to_bytes().unwrap();
        assert_eq!(bytes[0] & 0x0F, 3);
        assert_eq!(RtpPacket::from_bytes(&bytes).unwrap(), packet);
    }

    #[test]
    fn test_rtp_packet_empty_payload() {
        let packet = RtpPacket::new(RtpHeader::new(0, 1), vec![]);
        let bytes = packet.to_bytes().unwrap();
        assert_eq!(bytes.len(), 12);
        assert!(RtpPacket::from_bytes(&bytes).unwrap().payload.is_empty());
    }

    #[test]
    fn test_rtp_parse_truncated_header() {
        for len in 0..RtpHeader::SIZE {
            let data = vec![0x80; len];
            assert!(matches!(
                RtpPacket::from_bytes(&data),
                Err(NetworkError::Rtp(_))
            ));
        }
    }

    #[test]
    fn test_rtp_parse_wrong_version() {
        let mut bytes = sample_packet().to_bytes().unwrap();
        bytes[0] = (1 << 6) | (bytes[0] & 0x3F);
        assert!(matches!(
            RtpPacket::from_bytes(&bytes),
            Err(NetworkError::Rtp(_))
        ));
    }

    #[test]
    fn test_rtp_parse_rejects_extension_and_padding() {
        let bytes = sample_packet().to_bytes().unwrap();

        let mut with_padding = bytes.clone();
        with_padding[0] |= 0x20;
        assert!(RtpPacket::from_bytes(&with_padding).is_err());

        let mut with_extension = bytes;
        with_extension[0] |= 0x10;
        assert!(RtpPacket::from_bytes(&with_extension).is_err());
    }

    #[test]
    fn test_rtp_parse_truncated_csrc_list() {
        let mut bytes = sample_packet().to_bytes().unwrap();
        bytes.truncate(RtpHeader::SIZE);
        bytes[0] |= 0x02;
        assert!(RtpPacket::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_rtp_payload_too_large() {
        let max = MAX_DATAGRAM_SIZE - RtpHeader::SIZE;

        let fits = RtpPacket::new(RtpHeader::new(96, 1), vec![0; max]);
        assert!(fits.to_bytes().is_ok());

        let too_big = RtpPacket::new(RtpHeader::new(96, 1), vec![0; max + 1]);
        match too_big.to_bytes() {
            Err(NetworkError::PayloadTooLarge { size, max: limit }) => {
                assert_eq!(size, max + 1);
                assert_eq!(limit, max);
            }
            other => panic!("Expected PayloadTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_rtp_payload_type_out_of_range() {
        let packet = RtpPacket::new(RtpHeader::new(200, 1), vec![1]);
        assert!(matches!(packet.to_bytes(), Err(NetworkError::Rtp(_))));
    }

    #[test]
    fn test_sequence_and_timestamp_extremes() {
        let mut header = RtpHeader::new(0, u32::MAX);
        header.sequence_number = u16::MAX;
        header.timestamp = u32::MAX;

        let packet = RtpPacket::new(header, vec![1, 2, 3]);
        let decoded = RtpPacket::from_bytes(&packet.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.header.sequence_number, u16::MAX);
        assert_eq!(decoded.header.timestamp, u32::MAX);
        assert_eq!(decoded.header.ssrc, u32::MAX);
    }
}
