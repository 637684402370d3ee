//! Value types shared across the passflag crates.
//!
//! These types carry no pipeline logic. They exist so that passwords, secrets and flags are
//! never passed around as bare strings once they have crossed an input boundary.

use std::fmt;
use std::str::FromStr;

/// Literal prefix of every flag.
pub const FLAG_PREFIX: &str = "flag{";

/// Literal suffix of every flag.
pub const FLAG_SUFFIX: &str = "}";

/// Length of the hyphenated UUID token inside a flag.
const TOKEN_LEN: usize = 36;

/// Byte offsets of the hyphens in a hyphenated UUID token.
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty
    #[error("Text cannot be empty")]
    Empty,
    /// The input is not of the form `flag{xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx}`
    #[error("malformed flag: {0}")]
    MalformedFlag(String),
}

/// A candidate password for a single attempt.
///
/// The bytes are kept exactly as supplied; no trimming or normalisation is applied. `Debug`
/// output is redacted so a password never ends up in a log line by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Vec<u8>);

impl Password {
    /// Wraps the given bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw password bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password(<{} bytes>)", self.0.len())
    }
}

impl AsRef<[u8]> for Password {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<Vec<u8>> for Password {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// A reference secret that is guaranteed to be non-empty.
///
/// Unlike display text, the secret is not trimmed: surrounding whitespace is part of the
/// secret. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretText(Vec<u8>);

impl SecretText {
    /// Creates a new `SecretText`.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if `input` has no bytes.
    pub fn new(input: impl Into<Vec<u8>>) -> Result<Self, TextError> {
        let bytes = input.into();
        if bytes.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretText(<redacted>)")
    }
}

/// The final token: `flag{<uuid>}`.
///
/// A `Flag` built with [`Flag::wrap`] is trusted to contain whatever token it was given; a
/// `Flag` built with [`Flag::parse`] is guaranteed to hold a lower-case hyphenated UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Flag(String);

impl Flag {
    /// Wraps a token in the flag template.
    pub fn wrap(token: impl fmt::Display) -> Self {
        Self(format!("{FLAG_PREFIX}{token}{FLAG_SUFFIX}"))
    }

    /// Parses a string that must already be a well-formed flag.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for an empty input and [`TextError::MalformedFlag`] when the
    /// template or the UUID token inside it is wrong.
    pub fn parse(input: &str) -> Result<Self, TextError> {
        if input.is_empty() {
            return Err(TextError::Empty);
        }

        let token = input
            .strip_prefix(FLAG_PREFIX)
            .and_then(|rest| rest.strip_suffix(FLAG_SUFFIX))
            .ok_or_else(|| {
                TextError::MalformedFlag(format!(
                    "expected {FLAG_PREFIX}...{FLAG_SUFFIX}, got: '{input}'"
                ))
            })?;

        if !Self::is_token(token) {
            return Err(TextError::MalformedFlag(format!(
                "token must be a lower-case hyphenated UUID, got: '{token}'"
            )));
        }

        Ok(Self(input.to_owned()))
    }

    /// Returns the token between the braces.
    pub fn token(&self) -> &str {
        let end = self.0.len() - FLAG_SUFFIX.len();
        &self.0[FLAG_PREFIX.len()..end]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_token(token: &str) -> bool {
        token.len() == TOKEN_LEN
            && token.bytes().enumerate().all(|(i, b)| {
                if HYPHEN_POSITIONS.contains(&i) {
                    b == b'-'
                } else {
                    matches!(b, b'0'..=b'9' | b'a'..=b'f')
                }
            })
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Flag {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Flag::parse(s)
    }
}

impl AsRef<str> for Flag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for Flag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Flag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Flag::parse(&s).map_err(serde::de::Error::custom)
    }
}
