//! STUN attribute types (RFC 5389 Section 15).

/// Attribute types understood by the binding client and shared with TURN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    /// MAPPED-ADDRESS (0x0001)
    MappedAddress,
    /// USERNAME (0x0006)
    Username,
    /// MESSAGE-INTEGRITY (0x0008)
    MessageIntegrity,
    /// ERROR-CODE (0x0009)
    ErrorCode,
    /// REALM (0x0014)
    Realm,
    /// NONCE (0x0015)
    Nonce,
    /// XOR-MAPPED-ADDRESS (0x0020)
    XorMappedAddress,
    /// SOFTWARE (0x8022)
    Software,
    /// FINGERPRINT (0x8028)
    Fingerprint,
}

impl AttributeType {
    pub fn to_u16(self) -> u16 {
        match self {
            AttributeType::MappedAddress => 0x0001,
            AttributeType::Username => 0x0006,
            AttributeType::MessageIntegrity => 0x0008,
            AttributeType::ErrorCode => 0x0009,
            AttributeType::Realm => 0x0014,
            AttributeType::Nonce => 0x0015,
            AttributeType::XorMappedAddress => 0x0020,
            AttributeType::Software => 0x8022,
            AttributeType::Fingerprint => 0x8028,
        }
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0001 => Some(AttributeType::MappedAddress),
            0x0006 => Some(AttributeType::Username),
            0x0008 => Some(AttributeType::MessageIntegrity),
            0x0009 => Some(AttributeType::ErrorCode),
            0x0014 => Some(AttributeType::Realm),
            0x0015 => Some(AttributeType::Nonce),
            0x0020 => Some(AttributeType::XorMappedAddress),
            0x8022 => Some(AttributeType::Software),
            0x8028 => Some(AttributeType::Fingerprint),
            _ => None,
        }
    }

    /// Attributes below 0x8000 must be understood by the receiver.
    pub fn is_comprehension_required(code: u16) -> bool {
        code < 0x8000
    }
}

impl From<AttributeType> for u16 {
    fn from(attr: AttributeType) -> u16 {
        attr.to_u16()
    }
}
