//! SDP media description (`m=` section).

use std::fmt;

use crate::attribute::{Attribute, RtpMap};
use crate::connection::Connection;
use crate::errors::SdpError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescription {
    pub media_type: String,
    pub port: u16,
    pub protocol: String,
    pub formats: Vec<String>,
    pub connection: Option<Connection>,
    pub attributes: Vec<Attribute>,
}

const VALID_MEDIA_TYPES: &[&str] = &["audio", "video", "text", "application", "message"];

/// RTP/AVP payload types with a static mapping (RFC 3551), by name.
const STATIC_PAYLOAD_TYPES: &[(u8, &str, u32)] = &[(0, "PCMU", 8000), (8, "PCMA", 8000), (9, "G722", 8000)];

impl MediaDescription {
    /// An `RTP/AVP` audio section on `port` with no formats yet.
    pub fn audio(port: u16) -> Self {
        Self {
            media_type: "audio".to_string(),
            port,
            protocol: "RTP/AVP".to_string(),
            formats: Vec::new(),
            connection: None,
            attributes: Vec::new(),
        }
    }

    pub fn parse(value: &str) -> Result<Self, SdpError> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(SdpError::InvalidMediaFormat);
        }

        let port = parts[1].parse().map_err(|_| SdpError::InvalidPort)?;

        Ok(MediaDescription {
            media_type: parts[0].to_string(),
            port,
            protocol: parts[2].to_string(),
            formats: parts[3..].iter().map(|s| s.to_string()).collect(),
            connection: None,
            attributes: Vec::new(),
        })
    }

    pub fn validate(&self) -> Result<(), SdpError> {
        if !VALID_MEDIA_TYPES.contains(&self.media_type.as_str()) {
            return Err(SdpError::InvalidMediaType(self.media_type.clone()));
        }
        if self.formats.is_empty() {
            return Err(SdpError::NoMediaFormats);
        }
        Ok(())
    }

    /// Adds a payload type to the format list and, when given, its rtpmap.
    pub fn add_format(&mut self, payload_type: u8, rtpmap: Option<RtpMap>) {
        self.formats.push(payload_type.to_string());
        if let Some(map) = rtpmap {
            self.attributes.push(map.to_attribute());
        }
    }

    /// Every well-formed `a=rtpmap` in this section.
    pub fn rtpmaps(&self) -> impl Iterator<Item = RtpMap> + '_ {
        self.attributes
            .iter()
            .filter(|attr| attr.name == RtpMap::NAME)
            .filter_map(|attr| attr.value.as_deref())
            .filter_map(|value| RtpMap::parse(value).ok())
    }

    /// Mapping for `payload_type`: its rtpmap if present, else the static table.
    pub fn mapping_for(&self, payload_type: u8) -> Option<RtpMap> {
        self.rtpmaps()
            .find(|map| map.payload_type == payload_type)
            .or_else(|| {
                STATIC_PAYLOAD_TYPES
                    .iter()
                    .find(|(pt, _, _)| *pt == payload_type)
                    .map(|(pt, name, clock)| RtpMap {
                        payload_type: *pt,
                        encoding: name.to_string(),
                        clock_rate: *clock,
                        channels: None,
                    })
            })
    }
}

impl fmt::Display for MediaDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m={} {} {} {}\r\n",
            self.media_type,
            self.port,
            self.protocol,
            self.formats.join(" ")
        )?;

        if let Some(ref conn) = self.connection {
            write!(f, "{}", conn)?;
        }

        for attr in &self.attributes {
            write!(f, "{}", attr)?;
        }

        Ok(())
    }
}
