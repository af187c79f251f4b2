//! Long-term credentials (RFC 5389 Section 10.2).

use std::fmt;

/// Username and password for a TURN server, plus the realm and nonce the
/// server hands out in its 401 challenge.
#[derive(Clone, PartialEq, Eq)]
pub struct LongTermCredentials {
    pub username: String,
    password: String,
    pub realm: Option<String>,
    pub nonce: Option<Vec<u8>>,
}

impl LongTermCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            realm: None,
            nonce: None,
        }
    }

    /// True once a challenge has supplied realm and nonce.
    pub fn is_challenged(&self) -> bool {
        self.realm.is_some() && self.nonce.is_some()
    }

    /// HMAC key: `MD5(username ":" realm ":" password)`.
    pub fn key(&self) -> [u8; 16] {
        let realm = self.realm.as_deref().unwrap_or_default();
        let input = format!("{}:{}:{}", self.username, realm, self.password);
        md5::compute(input.as_bytes()).into()
    }
}

impl fmt::Debug for LongTermCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LongTermCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("realm", &self.realm)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_derivation() {
        let mut creds = LongTermCredentials::new("alice", "secret");
        creds.realm = Some("example.org".to_string());

        let expected = [
            0x54, 0x3e, 0x1a, 0xec, 0x5d, 0x36, 0x14, 0xf0, 0x31, 0x41, 0x65, 0x2d, 0x6a, 0xda,
            0x51, 0xb2,
        ];
        assert_eq!(creds.key(), expected);
    }

    #[test]
    fn test_is_challenged() {
        let mut creds = LongTermCredentials::new("alice", "secret");
        assert!(!creds.is_challenged());
        creds.realm = Some("example.org".to_string());
        creds.nonce = Some(b"abc".to_vec());
        assert!(creds.is_challenged());
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = LongTermCredentials::new("alice", "secret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret"));
    }
}
