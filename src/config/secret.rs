//! Secret configuration values
//!
//! Credentials such as the PostgreSQL connection string are held in
//! `secrecy::Secret`, which zeroes memory on drop and redacts `Debug` output.
//! Call `expose_secret()` at the point of use.
//!
//! ```rust
//! use archivist::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let dsn = secret_string("postgresql://svc:pw@db/archivist".to_string());
//! assert!(dsn.expose_secret().starts_with("postgresql://"));
//! assert!(!format!("{dsn:?}").contains("pw@"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use zeroize::Zeroize;

/// String payload of a [`SecretString`]
///
/// Derefs to `str` so callers can parse or inspect the exposed value in place.
#[derive(Clone, Zeroize, Serialize, Deserialize)]
#[zeroize(drop)]
#[serde(transparent)]
pub struct SecretValue(String);

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue([REDACTED])")
    }
}

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl Deref for SecretValue {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Secret string, zeroized on drop and redacted in `Debug`
pub type SecretString = Secret<SecretValue>;

/// Wrap a string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("postgresql://a:b@host/db".to_string());
        assert_eq!(secret.expose_secret(), "postgresql://a:b@host/db");
        assert!(secret.expose_secret().starts_with("postgresql://"));
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        let debug_output = format!("{secret:?}");

        assert!(!debug_output.contains("sensitive-data"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_secret_toml_round_trip() {
        #[derive(Serialize, Deserialize)]
        struct Section {
            connection_string: SecretString,
        }

        let parsed: Section =
            toml::from_str("connection_string = \"postgresql://u:p@h/db\"").unwrap();
        assert_eq!(parsed.connection_string.expose_secret(), "postgresql://u:p@h/db");

        let rendered = toml::to_string(&parsed).unwrap();
        assert!(rendered.contains("postgresql://u:p@h/db"));
    }
}
