//! SDP connection data (`c=` line).

use std::fmt;
use std::net::IpAddr;

use crate::errors::SdpError;

/// `IP4` or `IP6` for `address`.
pub fn address_type(address: &IpAddr) -> &'static str {
    match address {
        IpAddr::V4(_) => "IP4",
        IpAddr::V6(_) => "IP6",
    }
}

/// `c=IN <addrtype> <address>`. Multicast TTL and address counts are not
/// used by unicast audio and are dropped on parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub address: IpAddr,
}

impl Connection {
    pub fn new(address: IpAddr) -> Self {
        Self { address }
    }

    pub fn parse(value: &str) -> Result<Self, SdpError> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        let [network, addr_type, address] = parts[..] else {
            return Err(SdpError::InvalidConnectionFormat);
        };

        if network != "IN" {
            return Err(SdpError::InvalidNetworkType);
        }
        if addr_type != "IP4" && addr_type != "IP6" {
            return Err(SdpError::InvalidAddressType);
        }

        let host = address.split('/').next().unwrap_or(address);
        let address: IpAddr = host.parse().map_err(|_| SdpError::InvalidIpAddress)?;
        if addr_type != address_type(&address) {
            return Err(SdpError::AddressTypeMismatch);
        }

        Ok(Connection { address })
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "c=IN {} {}\r\n",
            address_type(&self.address),
            self.address
        )
    }
}
