//! XOR-MAPPED-ADDRESS style address encoding
//!
//! The port is XOR'd with the top 16 bits of the magic cookie and the
//! address with the magic cookie followed by the transaction ID. TURN's
//! XOR-RELAYED-ADDRESS uses the same layout.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::errors::StunError;
use crate::message_header::MAGIC_COOKIE;

const FAMILY_IPV4: u8 = 0x01;
const FAMILY_IPV6: u8 = 0x02;

fn xor_mask(transaction_id: &[u8; 12]) -> [u8; 16] {
    let mut mask = [0u8; 16];
    mask[..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
    mask[4..].copy_from_slice(transaction_id);
    mask
}

/// Decodes an XOR'd address attribute value.
pub fn decode(bytes: &[u8], transaction_id: &[u8; 12]) -> Result<SocketAddr, StunError> {
    if bytes.len() < 4 {
        return Err(StunError::AttributeTooShort);
    }

    let mask = xor_mask(transaction_id);
    let port = u16::from_be_bytes([bytes[2], bytes[3]]) ^ (MAGIC_COOKIE >> 16) as u16;

    match bytes[1] {
        FAMILY_IPV4 => {
            let raw = bytes.get(4..8).ok_or(StunError::AttributeTooShort)?;
            let ip = Ipv4Addr::new(
                raw[0] ^ mask[0],
                raw[1] ^ mask[1],
                raw[2] ^ mask[2],
                raw[3] ^ mask[3],
            );
            Ok(SocketAddr::new(IpAddr::V4(ip), port))
        }
        FAMILY_IPV6 => {
            let raw = bytes.get(4..20).ok_or(StunError::AttributeTooShort)?;
            let mut octets = [0u8; 16];
            for (i, octet) in octets.iter_mut().enumerate() {
                *octet = raw[i] ^ mask[i];
            }
            Ok(SocketAddr::new(IpAddr::V6(Ipv6Addr::from(octets)), port))
        }
        family => Err(StunError::InvalidAddressFamily(family)),
    }
}

/// Encodes `addr` as an XOR'd address attribute value.
pub fn encode(addr: SocketAddr, transaction_id: &[u8; 12]) -> Vec<u8> {
    let mask = xor_mask(transaction_id);
    let port = addr.port() ^ (MAGIC_COOKIE >> 16) as u16;

    let (family, octets): (u8, Vec<u8>) = match addr.ip() {
        IpAddr::V4(ip) => (FAMILY_IPV4, ip.octets().to_vec()),
        IpAddr::V6(ip) => (FAMILY_IPV6, ip.octets().to_vec()),
    };

    let mut value = Vec::with_capacity(4 + octets.len());
    value.push(0);
    value.push(family);
    value.extend_from_slice(&port.to_be_bytes());
    value.extend(octets.iter().zip(mask.iter()).map(|(b, m)| b ^ m));
    value
}
