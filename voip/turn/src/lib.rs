//! TURN Module - Traversal Using Relays around NAT
//!
//! Relay allocation according to RFC 5766, authenticated with the RFC 5389
//! long-term credential mechanism. Messages are built with the `stun` codec.

pub mod client;
pub mod credentials;
pub mod errors;
pub mod turn_attribute_type;
pub mod turn_message_type;

pub use client::TurnClient;
pub use credentials::LongTermCredentials;
pub use errors::{Result, TurnError};
pub use turn_attribute_type::{TransportProtocol, TurnAttributeType};
pub use turn_message_type::TurnMethod;
