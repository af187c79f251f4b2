//! STUN Module - Session Traversal Utilities for NAT
//!
//! RFC 5389 message codec and a blocking binding client used to discover the
//! server-reflexive address of a UDP socket. The codec is method-agnostic so
//! the TURN crate builds its Allocate and Refresh transactions on top of it.

mod attribute_type;
mod client;
mod errors;
pub mod integrity;
mod message;
mod message_builder;
mod message_header;
mod message_type;
pub mod xor_address;

pub use attribute_type::AttributeType;
pub use client::StunClient;
pub use errors::StunError;
pub use message::{Message, RawAttribute};
pub use message_builder::MessageBuilder;
pub use message_header::{MAGIC_COOKIE, MessageHeader};
pub use message_type::{MessageClass, MessageType, Method};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, StunError>;
