//! SDP attributes (`a=` lines).

use std::fmt;

use crate::errors::SdpError;

/// `a=<name>` or `a=<name>:<value>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

impl Attribute {
    /// Parses the text after `a=`.
    pub fn parse(value: &str) -> Self {
        match value.split_once(':') {
            Some((name, value)) => Attribute {
                name: name.to_string(),
                value: Some(value.to_string()),
            },
            None => Attribute {
                name: value.to_string(),
                value: None,
            },
        }
    }

    pub fn flag(name: &str) -> Self {
        Attribute {
            name: name.to_string(),
            value: None,
        }
    }

    pub fn with_value(name: &str, value: impl Into<String>) -> Self {
        Attribute {
            name: name.to_string(),
            value: Some(value.into()),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(val) => write!(f, "a={}:{}\r\n", self.name, val),
            None => write!(f, "a={}\r\n", self.name),
        }
    }
}

/// Payload mapping carried by `a=rtpmap:<pt> <encoding>/<clock>[/<channels>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpMap {
    pub payload_type: u8,
    pub encoding: String,
    pub clock_rate: u32,
    pub channels: Option<u8>,
}

impl RtpMap {
    pub const NAME: &'static str = "rtpmap";

    pub fn parse(value: &str) -> Result<Self, SdpError> {
        let invalid = || SdpError::InvalidRtpMap(value.to_string());

        let (payload_type, mapping) = value.trim().split_once(' ').ok_or_else(invalid)?;
        let mut parts = mapping.trim().split('/');

        let payload_type = payload_type.parse().map_err(|_| invalid())?;
        let encoding = parts.next().filter(|e| !e.is_empty()).ok_or_else(invalid)?;
        let clock_rate = parts
            .next()
            .and_then(|c| c.parse().ok())
            .ok_or_else(invalid)?;
        let channels = match parts.next() {
            Some(c) => Some(c.parse().map_err(|_| invalid())?),
            None => None,
        };

        Ok(RtpMap {
            payload_type,
            encoding: encoding.to_string(),
            clock_rate,
            channels,
        })
    }

    pub fn to_attribute(&self) -> Attribute {
        let mut value = format!("{} {}/{}", self.payload_type, self.encoding, self.clock_rate);
        if let Some(channels) = self.channels {
            value.push_str(&format!("/{}", channels));
        }
        Attribute::with_value(Self::NAME, value)
    }
}
