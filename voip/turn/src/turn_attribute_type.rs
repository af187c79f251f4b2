//! TURN attribute types.
//!
//! TURN adds these to the STUN attributes defined in the `stun` crate.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAttributeType {
    /// LIFETIME (0x000D) - allocation lifetime in seconds
    Lifetime,
    /// XOR-PEER-ADDRESS (0x0012)
    XorPeerAddress,
    /// XOR-RELAYED-ADDRESS (0x0016) - address allocated on the relay
    XorRelayedAddress,
    /// REQUESTED-TRANSPORT (0x0019) - transport protocol for the relay
    RequestedTransport,
}

impl TurnAttributeType {
    pub fn to_u16(self) -> u16 {
        match self {
            TurnAttributeType::Lifetime => 0x000D,
            TurnAttributeType::XorPeerAddress => 0x0012,
            TurnAttributeType::XorRelayedAddress => 0x0016,
            TurnAttributeType::RequestedTransport => 0x0019,
        }
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x000D => Some(TurnAttributeType::Lifetime),
            0x0012 => Some(TurnAttributeType::XorPeerAddress),
            0x0016 => Some(TurnAttributeType::XorRelayedAddress),
            0x0019 => Some(TurnAttributeType::RequestedTransport),
            _ => None,
        }
    }
}

impl From<TurnAttributeType> for u16 {
    fn from(attr: TurnAttributeType) -> u16 {
        attr.to_u16()
    }
}

/// Protocol numbers for REQUESTED-TRANSPORT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportProtocol {
    /// UDP (17)
    Udp,
}

impl TransportProtocol {
    pub fn protocol_number(self) -> u8 {
        match self {
            TransportProtocol::Udp => 17,
        }
    }

    /// REQUESTED-TRANSPORT value: protocol number followed by three RFFU bytes.
    pub fn to_attribute_value(self) -> [u8; 4] {
        [self.protocol_number(), 0, 0, 0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_values() {
        assert_eq!(TurnAttributeType::Lifetime.to_u16(), 0x000D);
        assert_eq!(u16::from(TurnAttributeType::XorRelayedAddress), 0x0016);
        assert_eq!(
            TurnAttributeType::from_u16(0x0019),
            Some(TurnAttributeType::RequestedTransport)
        );
        assert_eq!(TurnAttributeType::from_u16(0x0020), None);
    }

    #[test]
    fn test_requested_transport_value() {
        assert_eq!(TransportProtocol::Udp.to_attribute_value(), [17, 0, 0, 0]);
    }
}
