//! STUN message structure
//!
//! A STUN message is a 20-byte header followed by zero or more
//! type-length-value attributes, each padded to a 4-byte boundary.

use std::net::SocketAddr;

use crate::attribute_type::AttributeType;
use crate::errors::StunError;
use crate::message_header::MessageHeader;
use crate::message_type::MessageType;
use crate::xor_address;

/// A complete STUN message according to RFC 5389.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    /// Encoded attributes, padding included.
    pub attributes: Vec<u8>,
}

/// One attribute borrowed from a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAttribute<'a> {
    pub attr_type: u16,
    pub value: &'a [u8],
}

impl Message {
    pub fn new(message_type: MessageType, transaction_id: [u8; 12]) -> Self {
        Self {
            header: MessageHeader::new(message_type, transaction_id),
            attributes: Vec::new(),
        }
    }

    /// Appends an attribute, padding the value to a 4-byte boundary and
    /// updating the header length.
    pub fn add_attribute(&mut self, attr_type: impl Into<u16>, value: &[u8]) {
        let padding = padding_for(value.len());
        self.attributes.reserve(4 + value.len() + padding);

        self.attributes.extend_from_slice(&attr_type.into().to_be_bytes());
        self.attributes
            .extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.attributes.extend_from_slice(value);
        self.attributes.resize(self.attributes.len() + padding, 0);

        self.header.set_message_length(self.attributes.len() as u16);
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(MessageHeader::SIZE + self.attributes.len());
        bytes.extend_from_slice(&self.header.encode());
        bytes.extend_from_slice(&self.attributes);
        bytes
    }

    /// Decodes a message and validates the attribute framing, so that
    /// [`Message::attributes`] can walk the body without further checks.
    pub fn decode(bytes: &[u8]) -> Result<Self, StunError> {
        let header = MessageHeader::decode(bytes)?;

        let total_len = MessageHeader::SIZE + header.message_length as usize;
        if bytes.len() < total_len {
            return Err(StunError::MessageTooShort);
        }

        let attributes = bytes[MessageHeader::SIZE..total_len].to_vec();
        validate_attributes(&attributes)?;

        Ok(Self { header, attributes })
    }

    pub fn message_type(&self) -> MessageType {
        self.header.message_type
    }

    pub fn transaction_id(&self) -> [u8; 12] {
        self.header.transaction_id
    }

    pub fn attributes_bytes(&self) -> &[u8] {
        &self.attributes
    }

    /// Iterates over the attributes in wire order.
    pub fn attributes(&self) -> Attributes<'_> {
        Attributes {
            bytes: &self.attributes,
            offset: 0,
        }
    }

    /// Value of the first attribute of `attr_type`.
    pub fn attribute(&self, attr_type: impl Into<u16>) -> Option<&[u8]> {
        let wanted = attr_type.into();
        self.attributes()
            .find(|attr| attr.attr_type == wanted)
            .map(|attr| attr.value)
    }

    /// Reflexive address carried in XOR-MAPPED-ADDRESS.
    ///
    /// A missing attribute and a malformed one are both errors.
    pub fn xor_mapped_address(&self) -> Result<SocketAddr, StunError> {
        let value = self
            .attribute(AttributeType::XorMappedAddress)
            .ok_or(StunError::MissingAttribute("XOR-MAPPED-ADDRESS"))?;
        xor_address::decode(value, &self.transaction_id())
    }

    pub fn add_xor_address(&mut self, attr_type: impl Into<u16>, addr: SocketAddr) {
        let value = xor_address::encode(addr, &self.transaction_id());
        self.add_attribute(attr_type, &value);
    }

    /// ERROR-CODE as `(code, reason)`.
    pub fn error_code(&self) -> Option<(u16, String)> {
        let value = self.attribute(AttributeType::ErrorCode)?;
        if value.len() < 4 {
            return None;
        }
        let code = u16::from(value[2] & 0x07) * 100 + u16::from(value[3]);
        let reason = String::from_utf8_lossy(&value[4..]).into_owned();
        Some((code, reason))
    }

    pub fn add_error_code(&mut self, code: u16, reason: &str) {
        let mut value = vec![0, 0, (code / 100) as u8, (code % 100) as u8];
        value.extend_from_slice(reason.as_bytes());
        self.add_attribute(AttributeType::ErrorCode, &value);
    }

    /// Text value of a UTF-8 attribute such as REALM or USERNAME.
    pub fn text_attribute(&self, attr_type: impl Into<u16>) -> Option<String> {
        self.attribute(attr_type)
            .map(|value| String::from_utf8_lossy(value).into_owned())
    }

    /// Turns an error response into [`StunError::ErrorResponse`].
    pub fn check_error(&self) -> Result<(), StunError> {
        if self.message_type().class != crate::MessageClass::ErrorResponse {
            return Ok(());
        }
        let (code, reason) = self
            .error_code()
            .unwrap_or((0, "error response without ERROR-CODE".to_string()));
        Err(StunError::ErrorResponse { code, reason })
    }
}

/// Iterator returned by [`Message::attributes`].
pub struct Attributes<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for Attributes<'a> {
    type Item = RawAttribute<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.bytes.get(self.offset..)?;
        if rest.len() < 4 {
            return None;
        }
        let attr_type = u16::from_be_bytes([rest[0], rest[1]]);
        let length = u16::from_be_bytes([rest[2], rest[3]]) as usize;
        let value = rest.get(4..4 + length)?;
        self.offset += 4 + length + padding_for(length);
        Some(RawAttribute { attr_type, value })
    }
}

fn padding_for(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

fn validate_attributes(bytes: &[u8]) -> Result<(), StunError> {
    let mut offset = 0;
    while offset < bytes.len() {
        if offset + 4 > bytes.len() {
            return Err(StunError::AttributeTooShort);
        }
        let length = u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;
        offset += 4;
        if offset + length > bytes.len() {
            return Err(StunError::InvalidAttributeFormat);
        }
        offset += length + padding_for(length);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MessageClass, Method};
    use std::net::{IpAddr, Ipv4Addr};

    const TXID: [u8; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

    #[test]
    fn test_message_creation() {
        let message = Message::new(MessageType::BINDING_REQUEST, TXID);

        assert_eq!(message.message_type(), MessageType::BINDING_REQUEST);
        assert_eq!(message.transaction_id(), TXID);
        assert!(message.attributes.is_empty());
        assert_eq!(message.encode().len(), MessageHeader::SIZE);
    }

    #[test]
    fn test_add_attribute_pads_value() {
        let mut message = Message::new(MessageType::BINDING_REQUEST, TXID);
        message.add_attribute(AttributeType::Username, b"alice");

        // 4 header bytes + 5 value bytes + 3 padding bytes
        assert_eq!(message.attributes.len(), 12);
        assert_eq!(message.header.message_length, 12);
        assert_eq!(&message.attributes[9..12], &[0, 0, 0]);
        assert_eq!(message.attribute(AttributeType::Username), Some(&b"alice"[..]));
    }

    #[test]
    fn test_encode_decode_keeps_attribute_order() {
        let mut message = Message::new(MessageType::new(Method::new(0x003), MessageClass::Request), TXID);
        message.add_attribute(0x0019u16, &[17, 0, 0, 0]);
        message.add_attribute(AttributeType::Realm, b"example.org");

        let decoded = Message::decode(&message.encode()).unwrap();
        let types: Vec<u16> = decoded.attributes().map(|a| a.attr_type).collect();
        assert_eq!(types, vec![0x0019, 0x0014]);
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_decode_rejects_truncated_attribute() {
        let mut message = Message::new(MessageType::BINDING_RESPONSE, TXID);
        message.add_attribute(AttributeType::Software, b"test");
        let mut bytes = message.encode();
        // Claim a 64-byte value inside an 8-byte body
        bytes[MessageHeader::SIZE + 3] = 64;

        assert_eq!(Message::decode(&bytes), Err(StunError::InvalidAttributeFormat));
    }

    #[test]
    fn test_decode_rejects_short_body() {
        let mut message = Message::new(MessageType::BINDING_RESPONSE, TXID);
        message.add_attribute(AttributeType::Software, b"test");
        let bytes = message.encode();

        assert_eq!(
            Message::decode(&bytes[..bytes.len() - 4]),
            Err(StunError::MessageTooShort)
        );
    }

    #[test]
    fn test_xor_mapped_address_round_trip() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 5)), 40000);
        let mut message = Message::new(MessageType::BINDING_RESPONSE, TXID);
        message.add_xor_address(AttributeType::XorMappedAddress, addr);

        let decoded = Message::decode(&message.encode()).unwrap();
        assert_eq!(decoded.xor_mapped_address(), Ok(addr));
    }

    #[test]
    fn test_xor_mapped_address_missing() {
        let message = Message::new(MessageType::BINDING_RESPONSE, TXID);
        assert_eq!(
            message.xor_mapped_address(),
            Err(StunError::MissingAttribute("XOR-MAPPED-ADDRESS"))
        );
    }

    #[test]
    fn test_xor_mapped_address_malformed() {
        let mut message = Message::new(MessageType::BINDING_RESPONSE, TXID);
        message.add_attribute(AttributeType::XorMappedAddress, &[0x00, 0x01, 0x3E]);
        assert_eq!(message.xor_mapped_address(), Err(StunError::AttributeTooShort));
    }

    #[test]
    fn test_error_code_round_trip() {
        let mut message = Message::new(MessageType::BINDING_ERROR, TXID);
        message.add_error_code(438, "Stale Nonce");

        assert_eq!(message.error_code(), Some((438, "Stale Nonce".to_string())));
        assert_eq!(
            message.check_error(),
            Err(StunError::ErrorResponse {
                code: 438,
                reason: "Stale Nonce".to_string()
            })
        );
    }

    #[test]
    fn test_check_error_on_success_response() {
        let message = Message::new(MessageType::BINDING_RESPONSE, TXID);
        assert_eq!(message.check_error(), Ok(()));
    }
}
