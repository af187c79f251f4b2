//! Fluent construction of session descriptions.

use crate::{
    attribute::Attribute, connection::Connection, errors::SdpError,
    media_description::MediaDescription, origin::Origin,
    session_description::SessionDescription, timing::Timing,
};

pub struct SessionDescriptionBuilder {
    session: SessionDescription,
}

impl SessionDescriptionBuilder {
    /// Starts a description with `s=-` and `t=0 0`.
    pub fn new(origin: Origin) -> Self {
        Self {
            session: SessionDescription {
                version: 0,
                origin,
                session_name: String::from("-"),
                connection: None,
                timing: Timing::default(),
                attributes: Vec::new(),
                media: Vec::new(),
            },
        }
    }

    pub fn session_name(mut self, name: impl Into<String>) -> Self {
        self.session.session_name = name.into();
        self
    }

    pub fn timing(mut self, timing: Timing) -> Self {
        self.session.timing = timing;
        self
    }

    pub fn connection(mut self, connection: Connection) -> Self {
        self.session.connection = Some(connection);
        self
    }

    pub fn add_media(mut self, media: MediaDescription) -> Self {
        self.session.media.push(media);
        self
    }

    pub fn add_attribute(mut self, attr: Attribute) -> Self {
        self.session.attributes.push(attr);
        self
    }

    pub fn build(self) -> Result<SessionDescription, SdpError> {
        self.session.validate()?;
        Ok(self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn address() -> IpAddr {
        "192.0.2.10".parse().unwrap()
    }

    fn audio_section() -> MediaDescription {
        let mut media = MediaDescription::audio(49170);
        media.add_format(0, None);
        media
    }

    #[test]
    fn test_builder_defaults() {
        let session = SessionDescriptionBuilder::new(Origin::anonymous(address()))
            .add_media(audio_section())
            .build()
            .unwrap();

        assert_eq!(session.session_name, "-");
        assert_eq!(session.timing, Timing::default());
        assert!(session.connection.is_none());
    }

    #[test]
    fn test_builder_requires_media() {
        let result = SessionDescriptionBuilder::new(Origin::anonymous(address())).build();
        assert_eq!(result.unwrap_err(), SdpError::NoMediaSections);
    }

    #[test]
    fn test_builder_rejects_backwards_timing() {
        let result = SessionDescriptionBuilder::new(Origin::anonymous(address()))
            .timing(Timing {
                start_time: 10,
                stop_time: 5,
            })
            .add_media(audio_section())
            .build();
        assert_eq!(result.unwrap_err(), SdpError::InvalidTiming);
    }

    #[test]
    fn test_builder_renders_in_line_order() {
        let session = SessionDescriptionBuilder::new(Origin::anonymous(address()))
            .session_name("call")
            .connection(Connection::new(address()))
            .add_attribute(Attribute::flag("sendrecv"))
            .add_media(audio_section())
            .build()
            .unwrap();

        assert_eq!(
            session.to_string(),
            "v=0\r\n\
             o=- 0 0 IN IP4 192.0.2.10\r\n\
             s=call\r\n\
             c=IN IP4 192.0.2.10\r\n\
             t=0 0\r\n\
             a=sendrecv\r\n\
             m=audio 49170 RTP/AVP 0\r\n"
        );
    }
}
