//! Complete SDP session description.

use std::fmt;

use crate::{
    attribute::Attribute, connection::Connection, errors::SdpError,
    media_description::MediaDescription, origin::Origin,
    session_description_builder::SessionDescriptionBuilder, timing::Timing,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub version: u8,
    pub origin: Origin,
    pub session_name: String,
    pub connection: Option<Connection>,
    pub timing: Timing,
    pub attributes: Vec<Attribute>,
    pub media: Vec<MediaDescription>,
}

impl SessionDescription {
    pub fn builder(origin: Origin) -> SessionDescriptionBuilder {
        SessionDescriptionBuilder::new(origin)
    }

    /// Parses SDP text. Unknown line types are skipped; LF and CRLF line
    /// endings are both accepted.
    pub fn parse(text: &str) -> Result<Self, SdpError> {
        let mut version = None;
        let mut origin = None;
        let mut session_name = String::new();
        let mut connection = None;
        let mut timing = Timing::default();
        let mut attributes = Vec::new();
        let mut media: Vec<MediaDescription> = Vec::new();

        for line in text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
            let (kind, value) = line.split_once('=').ok_or(SdpError::InvalidLineFormat)?;
            if kind.len() != 1 {
                return Err(SdpError::InvalidLineFormat);
            }

            match (kind, media.last_mut()) {
                ("v", _) => version = Some(value.parse().map_err(|_| SdpError::InvalidVersion)?),
                ("o", _) => origin = Some(Origin::parse(value)?),
                ("s", _) => session_name = value.to_string(),
                ("t", _) => timing = Timing::parse(value)?,
                ("m", _) => media.push(MediaDescription::parse(value)?),
                ("c", Some(section)) => section.connection = Some(Connection::parse(value)?),
                ("c", None) => connection = Some(Connection::parse(value)?),
                ("a", Some(section)) => section.attributes.push(Attribute::parse(value)),
                ("a", None) => attributes.push(Attribute::parse(value)),
                _ => {}
            }
        }

        let session = SessionDescription {
            version: version.ok_or(SdpError::InvalidVersion)?,
            origin: origin.ok_or(SdpError::InvalidOriginFormat)?,
            session_name,
            connection,
            timing,
            attributes,
            media,
        };
        session.validate()?;
        Ok(session)
    }

    pub fn validate(&self) -> Result<(), SdpError> {
        if self.version != 0 {
            return Err(SdpError::InvalidVersionNumber);
        }
        if self.session_name.is_empty() {
            return Err(SdpError::EmptySessionName);
        }
        self.timing.validate()?;

        if self.media.is_empty() {
            return Err(SdpError::NoMediaSections);
        }
        for media in &self.media {
            media.validate()?;
        }
        Ok(())
    }

    /// First media section of `media_type`.
    pub fn media_of_type(&self, media_type: &str) -> Option<&MediaDescription> {
        self.media.iter().find(|m| m.media_type == media_type)
    }
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v={}\r\n", self.version)?;
        write!(f, "{}", self.origin)?;
        write!(f, "s={}\r\n", self.session_name)?;
        if let Some(ref conn) = self.connection {
            write!(f, "{}", conn)?;
        }
        write!(f, "{}", self.timing)?;

        for attr in &self.attributes {
            write!(f, "{}", attr)?;
        }
        for media in &self.media {
            write!(f, "{}", media)?;
        }
        Ok(())
    }
}
