//! MESSAGE-INTEGRITY (RFC 5389 Section 15.4).
//!
//! The HMAC-SHA1 covers the message up to the attribute preceding
//! MESSAGE-INTEGRITY, with the header length already counting the 24-byte
//! integrity attribute.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::attribute_type::AttributeType;
use crate::errors::StunError;
use crate::message::Message;
use crate::message_header::MessageHeader;

type HmacSha1 = Hmac<Sha1>;

/// Size of the whole MESSAGE-INTEGRITY attribute, header included.
const INTEGRITY_ATTR_SIZE: usize = 24;

fn compute(key: &[u8], header: &MessageHeader, body: &[u8]) -> Result<[u8; 20], StunError> {
    let mut header = header.clone();
    header.set_message_length((body.len() + INTEGRITY_ATTR_SIZE) as u16);

    let mut mac = HmacSha1::new_from_slice(key).map_err(|_| StunError::IntegrityMismatch)?;
    mac.update(&header.encode());
    mac.update(body);
    let mut digest = [0u8; 20];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    Ok(digest)
}

/// Appends MESSAGE-INTEGRITY keyed with `key`. Must be the last attribute added.
pub fn add_message_integrity(message: &mut Message, key: &[u8]) -> Result<(), StunError> {
    let digest = compute(key, &message.header, &message.attributes)?;
    message.add_attribute(AttributeType::MessageIntegrity, &digest);
    Ok(())
}

/// Checks MESSAGE-INTEGRITY against `key`.
pub fn verify_message_integrity(message: &Message, key: &[u8]) -> Result<(), StunError> {
    let mut offset = 0;
    for attr in message.attributes() {
        if attr.attr_type == AttributeType::MessageIntegrity.to_u16() {
            let expected = compute(key, &message.header, &message.attributes[..offset])?;
            return if attr.value == &expected[..] {
                Ok(())
            } else {
                Err(StunError::IntegrityMismatch)
            };
        }
        offset += 4 + attr.value.len() + (4 - attr.value.len() % 4) % 4;
    }
    Err(StunError::MissingAttribute("MESSAGE-INTEGRITY"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageType;

    #[test]
    fn test_integrity_round_trip() {
        let mut message = Message::new(MessageType::BINDING_REQUEST, [3; 12]);
        message.add_attribute(AttributeType::Username, b"alice");
        add_message_integrity(&mut message, b"secret").unwrap();

        let decoded = Message::decode(&message.encode()).unwrap();
        assert_eq!(verify_message_integrity(&decoded, b"secret"), Ok(()));
        assert_eq!(
            verify_message_integrity(&decoded, b"other"),
            Err(StunError::IntegrityMismatch)
        );
    }

    #[test]
    fn test_integrity_attribute_length() {
        let mut message = Message::new(MessageType::BINDING_REQUEST, [3; 12]);
        add_message_integrity(&mut message, b"key").unwrap();

        assert_eq!(message.header.message_length as usize, INTEGRITY_ATTR_SIZE);
        assert_eq!(message.attribute(AttributeType::MessageIntegrity).map(<[u8]>::len), Some(20));
    }

    #[test]
    fn test_verify_without_integrity() {
        let message = Message::new(MessageType::BINDING_REQUEST, [3; 12]);
        assert_eq!(
            verify_message_integrity(&message, b"key"),
            Err(StunError::MissingAttribute("MESSAGE-INTEGRITY"))
        );
    }

    #[test]
    fn test_tampered_message_fails() {
        let mut message = Message::new(MessageType::BINDING_REQUEST, [3; 12]);
        message.add_attribute(AttributeType::Username, b"alice");
        add_message_integrity(&mut message, b"secret").unwrap();

        let mut bytes = message.encode();
        bytes[MessageHeader::SIZE + 4] = b'A';
        let tampered = Message::decode(&bytes).unwrap();
        assert_eq!(
            verify_message_integrity(&tampered, b"secret"),
            Err(StunError::IntegrityMismatch)
        );
    }
}
