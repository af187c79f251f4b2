//! STUN message types
//!
//! A message type is a 12-bit method interleaved with a 2-bit class
//! (RFC 5389 Section 6):
//!
//! ```text
//!  0                 1
//!  2  3  4 5 6 7 8 9 0 1 2 3 4 5
//! +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
//! |M |M |M|M|M|C|M|M|M|C|M|M|M|M|
//! |11|10|9|8|7|1|6|5|4|0|3|2|1|0|
//! +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use std::fmt;

use crate::errors::StunError;

/// A STUN method. TURN methods are defined by the TURN crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Method(u16);

impl Method {
    /// Binding (0x001)
    pub const BINDING: Method = Method(0x001);

    /// Creates a method from its 12-bit code.
    pub const fn new(code: u16) -> Self {
        Method(code & 0x0FFF)
    }

    pub const fn code(self) -> u16 {
        self.0
    }
}

/// The class bits of a message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageClass {
    Request,
    Indication,
    SuccessResponse,
    ErrorResponse,
}

impl MessageClass {
    fn bits(self) -> u16 {
        match self {
            MessageClass::Request => 0b00,
            MessageClass::Indication => 0b01,
            MessageClass::SuccessResponse => 0b10,
            MessageClass::ErrorResponse => 0b11,
        }
    }

    fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => MessageClass::Request,
            0b01 => MessageClass::Indication,
            0b10 => MessageClass::SuccessResponse,
            _ => MessageClass::ErrorResponse,
        }
    }
}

/// STUN message type: method plus class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageType {
    pub method: Method,
    pub class: MessageClass,
}

impl MessageType {
    /// Binding Request (0x0001)
    pub const BINDING_REQUEST: MessageType = MessageType::new(Method::BINDING, MessageClass::Request);
    /// Binding Success Response (0x0101)
    pub const BINDING_RESPONSE: MessageType =
        MessageType::new(Method::BINDING, MessageClass::SuccessResponse);
    /// Binding Error Response (0x0111)
    pub const BINDING_ERROR: MessageType =
        MessageType::new(Method::BINDING, MessageClass::ErrorResponse);

    pub const fn new(method: Method, class: MessageClass) -> Self {
        Self { method, class }
    }

    /// Encodes the type into its wire value.
    pub fn to_u16(self) -> u16 {
        let m = self.method.code();
        let c = self.class.bits();
        (m & 0x000F) | ((m & 0x0070) << 1) | ((m & 0x0F80) << 2) | ((c & 0b01) << 4) | ((c & 0b10) << 7)
    }

    /// Parses a wire value. The two most significant bits must be zero.
    pub fn from_u16(value: u16) -> Result<Self, StunError> {
        if value & 0xC000 != 0 {
            return Err(StunError::InvalidMessageType(value));
        }
        let method = (value & 0x000F) | ((value & 0x00E0) >> 1) | ((value & 0x3E00) >> 2);
        let class = ((value >> 4) & 0b01) | ((value >> 7) & 0b10);
        Ok(Self {
            method: Method::new(method),
            class: MessageClass::from_bits(class),
        })
    }

    /// Response type matching this request's method.
    pub fn success(self) -> Self {
        Self::new(self.method, MessageClass::SuccessResponse)
    }

    /// Error type matching this request's method.
    pub fn error(self) -> Self {
        Self::new(self.method, MessageClass::ErrorResponse)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.to_u16())
    }
}
