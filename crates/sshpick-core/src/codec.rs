//! Packing of a profile's name, username and hostname into one keychain
//! service string of the form `name|user@host`.
//!
//! No escaping is done. A name containing `|`, or a username containing `@`,
//! will not decode back to the same fields.

const NAME_SEPARATOR: char = '|';
const HOST_SEPARATOR: char = '@';

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub username: String,
    pub hostname: String,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            hostname: hostname.into(),
        }
    }

    /// A profile with empty connection fields could not be decoded.
    pub fn is_malformed(&self) -> bool {
        self.username.is_empty() || self.hostname.is_empty()
    }

    pub fn target(&self) -> String {
        format!("{}{}{}", self.username, HOST_SEPARATOR, self.hostname)
    }
}

pub fn encode(name: &str, username: &str, hostname: &str) -> String {
    format!("{name}{NAME_SEPARATOR}{username}{HOST_SEPARATOR}{hostname}")
}

/// Splits a key into its fields. Any key missing either separator comes back
/// whole as the name with empty connection fields, including `name|no-at`.
pub fn decode(key: &str) -> Profile {
    if let Some((name, connection)) = key.split_once(NAME_SEPARATOR) {
        if let Some((username, hostname)) = connection.split_once(HOST_SEPARATOR) {
            return Profile::new(name, username, hostname);
        }
    }
    Profile::new(key, "", "")
}

pub fn display_name(key: &str) -> String {
    let profile = decode(key);
    if profile.is_malformed() {
        profile.name
    } else {
        format!("{} ({})", profile.name, profile.target())
    }
}
