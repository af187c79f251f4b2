//! STUN message header
//!
//! # Header Format (RFC 5389 Section 6)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |0 0|     STUN Message Type     |         Message Length        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                         Magic Cookie                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                                                               |
//! |                     Transaction ID (96 bits)                  |
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use crate::errors::StunError;
use crate::message_type::MessageType;

/// Magic cookie value defined in RFC 5389.
/// This value is used to identify STUN messages and for XOR operations.
pub const MAGIC_COOKIE: u32 = 0x2112A442;

/// The fixed 20-byte header preceding every STUN message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    /// The type of the message
    pub message_type: MessageType,
    /// Length of the message body (excluding the header)
    pub message_length: u16,
    /// Unique transaction identifier
    pub transaction_id: [u8; 12],
}

impl MessageHeader {
    /// Size of the STUN message header in bytes.
    pub const SIZE: usize = 20;

    /// Creates a header with an empty body.
    pub fn new(message_type: MessageType, transaction_id: [u8; 12]) -> Self {
        Self {
            message_type,
            message_length: 0,
            transaction_id,
        }
    }

    pub fn encode(&self) -> [u8; MessageHeader::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.message_type.to_u16().to_be_bytes());
        bytes[2..4].copy_from_slice(&self.message_length.to_be_bytes());
        bytes[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
        bytes[8..20].copy_from_slice(&self.transaction_id);
        bytes
    }

    /// Decodes the first 20 bytes of `bytes`. The body length must be a
    /// multiple of four.
    pub fn decode(bytes: &[u8]) -> Result<Self, StunError> {
        if bytes.len() < Self::SIZE {
            return Err(StunError::MessageTooShort);
        }

        let msg_type_value = u16::from_be_bytes([bytes[0], bytes[1]]);
        let message_type = MessageType::from_u16(msg_type_value)?;

        let message_length = u16::from_be_bytes([bytes[2], bytes[3]]);
        if message_length % 4 != 0 {
            return Err(StunError::InvalidAttributeFormat);
        }

        // Verify magic cookie
        let magic = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if magic != MAGIC_COOKIE {
            return Err(StunError::InvalidMagicCookie);
        }

        // Parse transaction ID
        let mut transaction_id = [0u8; 12];
        transaction_id.copy_from_slice(&bytes[8..20]);

        Ok(Self {
            message_type,
            message_length,
            transaction_id,
        })
    }

    pub fn set_message_length(&mut self, length: u16) {
        self.message_length = length;
    }

    /// True when `bytes` opens with a STUN header: the two leading bits
    /// clear and the magic cookie in place. RTP always sets version 2 in
    /// the leading bits, so the two never collide on a shared socket.
    pub fn is_stun(bytes: &[u8]) -> bool {
        bytes.len() >= Self::SIZE
            && bytes[0] & 0xC0 == 0
            && bytes[4..8] == MAGIC_COOKIE.to_be_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_header_encode_decode() {
        let transaction_id = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let header = MessageHeader::new(MessageType::BINDING_REQUEST, transaction_id);

        let encoded = header.encode();
        assert_eq!(encoded.len(), MessageHeader::SIZE);

        let decoded = MessageHeader::decode(&encoded).unwrap();
        assert_eq!(decoded.message_type, MessageType::BINDING_REQUEST);
        assert_eq!(decoded.transaction_id, transaction_id);
        assert_eq!(decoded.message_length, 0);
    }

    #[test]
    fn test_message_header_decode_invalid_magic_cookie() {
        let mut bytes = [0u8; 20];
        bytes[1] = 0x01;
        bytes[4..8].copy_from_slice(&[0xFF; 4]);

        let result = MessageHeader::decode(&bytes);
        assert!(matches!(result, Err(StunError::InvalidMagicCookie)));
    }

    #[test]
    fn test_message_header_decode_too_short() {
        let bytes = vec![0u8; 10];
        let result = MessageHeader::decode(&bytes);
        assert!(matches!(result, Err(StunError::MessageTooShort)));
    }

    #[test]
    fn test_is_stun_tells_stun_from_rtp() {
        let header = MessageHeader::new(MessageType::BINDING_RESPONSE, [3; 12]);
        assert!(MessageHeader::is_stun(&header.encode()));

        let mut rtp = [0u8; 20];
        rtp[0] = 0x80;
        rtp[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
        assert!(!MessageHeader::is_stun(&rtp));
        assert!(!MessageHeader::is_stun(&header.encode()[..12]));
    }

    #[test]
    fn test_message_header_rejects_unaligned_length() {
        let header = MessageHeader::new(MessageType::BINDING_RESPONSE, [7; 12]);
        let mut bytes = header.encode();
        bytes[3] = 6;
        assert!(matches!(
            MessageHeader::decode(&bytes),
            Err(StunError::InvalidAttributeFormat)
        ));
    }

    #[test]
    fn test_set_message_length() {
        let transaction_id = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let mut header = MessageHeader::new(MessageType::BINDING_REQUEST, transaction_id);

        header.set_message_length(100);
        assert_eq!(header.message_length, 100);
    }
}
