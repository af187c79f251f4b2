//! TURN methods (RFC 5766 Section 13).

use stun::{MessageClass, MessageType, Method};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnMethod {
    /// Allocate (0x003)
    Allocate,
    /// Refresh (0x004)
    Refresh,
}

impl TurnMethod {
    pub fn method(self) -> Method {
        match self {
            TurnMethod::Allocate => Method::new(0x003),
            TurnMethod::Refresh => Method::new(0x004),
        }
    }

    pub fn request(self) -> MessageType {
        MessageType::new(self.method(), MessageClass::Request)
    }

    pub fn from_method(method: Method) -> Option<Self> {
        match method.code() {
            0x003 => Some(TurnMethod::Allocate),
            0x004 => Some(TurnMethod::Refresh),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TurnMethod::Allocate => "Allocate",
            TurnMethod::Refresh => "Refresh",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(TurnMethod::Allocate.request().to_u16(), 0x0003);
        assert_eq!(TurnMethod::Allocate.request().success().to_u16(), 0x0103);
        assert_eq!(TurnMethod::Allocate.request().error().to_u16(), 0x0113);
        assert_eq!(TurnMethod::Refresh.request().to_u16(), 0x0004);
        assert_eq!(TurnMethod::Refresh.request().success().to_u16(), 0x0104);
    }

    #[test]
    fn test_from_method() {
        let parsed = MessageType::from_u16(0x0114).unwrap();
        assert_eq!(TurnMethod::from_method(parsed.method), Some(TurnMethod::Refresh));
        assert_eq!(TurnMethod::from_method(Method::BINDING), None);
    }
}
