//! Fluent construction of STUN messages.

use crate::errors::StunError;
use crate::integrity;
use crate::message::Message;
use crate::message_type::MessageType;

/// Builder for STUN messages.
///
/// Attributes are emitted in the order they were added; MESSAGE-INTEGRITY,
/// when requested, is always appended last.
///
/// ```
/// use stun::{AttributeType, MessageBuilder, MessageType};
///
/// let request = MessageBuilder::new(MessageType::BINDING_REQUEST)
///     .random_transaction_id()
///     .attribute(AttributeType::Software, b"softphone")
///     .build()
///     .unwrap();
/// assert!(request.attribute(AttributeType::Software).is_some());
/// ```
pub struct MessageBuilder {
    message_type: MessageType,
    transaction_id: Option<[u8; 12]>,
    attributes: Vec<(u16, Vec<u8>)>,
    integrity_key: Option<Vec<u8>>,
}

impl MessageBuilder {
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            transaction_id: None,
            attributes: Vec::new(),
            integrity_key: None,
        }
    }

    /// Uses 96 random bits as the transaction ID.
    pub fn random_transaction_id(mut self) -> Self {
        self.transaction_id = Some(rand::random());
        self
    }

    pub fn transaction_id(mut self, transaction_id: [u8; 12]) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }

    pub fn attribute(mut self, attr_type: impl Into<u16>, value: &[u8]) -> Self {
        self.attributes.push((attr_type.into(), value.to_vec()));
        self
    }

    /// Signs the message with MESSAGE-INTEGRITY keyed by `key`.
    pub fn integrity(mut self, key: &[u8]) -> Self {
        self.integrity_key = Some(key.to_vec());
        self
    }

    pub fn build(self) -> Result<Message, StunError> {
        let transaction_id = self
            .transaction_id
            .ok_or(StunError::MissingRequiredField("transaction_id"))?;

        let mut message = Message::new(self.message_type, transaction_id);
        for (attr_type, value) in &self.attributes {
            message.add_attribute(*attr_type, value);
        }
        if let Some(key) = self.integrity_key {
            integrity::add_message_integrity(&mut message, &key)?;
        }

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttributeType;

    #[test]
    fn test_random_transaction_ids_differ() {
        let first = MessageBuilder::new(MessageType::BINDING_REQUEST)
            .random_transaction_id()
            .build()
            .unwrap();
        let second = MessageBuilder::new(MessageType::BINDING_REQUEST)
            .random_transaction_id()
            .build()
            .unwrap();

        assert_ne!(first.transaction_id(), second.transaction_id());
    }

    #[test]
    fn test_missing_transaction_id() {
        let result = MessageBuilder::new(MessageType::BINDING_REQUEST).build();
        assert!(matches!(
            result,
            Err(StunError::MissingRequiredField("transaction_id"))
        ));
    }

    #[test]
    fn test_integrity_is_last_attribute() {
        let message = MessageBuilder::new(MessageType::BINDING_REQUEST)
            .transaction_id([9; 12])
            .integrity(b"key")
            .attribute(AttributeType::Username, b"bob")
            .build()
            .unwrap();

        let last = message.attributes().last().unwrap();
        assert_eq!(last.attr_type, AttributeType::MessageIntegrity.to_u16());
        assert_eq!(integrity::verify_message_integrity(&message, b"key"), Ok(()));
    }
}
