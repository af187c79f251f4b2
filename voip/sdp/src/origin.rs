//! SDP origin (`o=` line).

use std::fmt;
use std::net::IpAddr;

use crate::connection::address_type;
use crate::errors::SdpError;

/// `o=<username> <sess-id> <sess-version> IN <addrtype> <unicast-address>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub username: String,
    pub session_id: u64,
    pub session_version: u64,
    pub address: IpAddr,
}

impl Origin {
    /// An anonymous origin (`-`) with zero id and version.
    pub fn anonymous(address: IpAddr) -> Self {
        Self {
            username: String::from("-"),
            session_id: 0,
            session_version: 0,
            address,
        }
    }

    pub fn parse(value: &str) -> Result<Self, SdpError> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        let [username, session_id, session_version, network, addr_type, address] = parts[..] else {
            return Err(SdpError::InvalidOriginFormat);
        };

        if network != "IN" {
            return Err(SdpError::InvalidNetworkType);
        }
        let address: IpAddr = address.parse().map_err(|_| SdpError::InvalidIpAddress)?;
        if addr_type != address_type(&address) {
            return Err(SdpError::AddressTypeMismatch);
        }

        Ok(Origin {
            username: username.to_string(),
            session_id: session_id.parse().map_err(|_| SdpError::InvalidOriginFormat)?,
            session_version: session_version
                .parse()
                .map_err(|_| SdpError::InvalidOriginFormat)?,
            address,
        })
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "o={} {} {} IN {} {}\r\n",
            self.username,
            self.session_id,
            self.session_version,
            address_type(&self.address),
            self.address
        )
    }
}
