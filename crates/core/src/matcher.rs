//! Reference secret matching.
//!
//! The flag pipeline never knows how the reference secret is stored. It is handed a
//! [`SecretMatcher`] and only trusts a full-length match with no error.

use crate::check::Checked;
use crate::digest::{PasswordDigest, DIGEST_LEN};
use passflag_types::SecretText;
use std::sync::Arc;

/// Why a matcher stopped early.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("password length differs from the secret")]
    LengthMismatch,
    #[error("invalid secret digest: {0}")]
    InvalidDigest(String),
}

/// Confirms that a password equals a reference secret.
///
/// Implementations report how many password bytes matched. Callers treat anything other than
/// a full-length match without error as a wrong password.
pub trait SecretMatcher {
    fn match_secret(&self, password: &[u8]) -> Checked<MatchError>;
}

impl<T: SecretMatcher + ?Sized> SecretMatcher for &T {
    fn match_secret(&self, password: &[u8]) -> Checked<MatchError> {
        (**self).match_secret(password)
    }
}

impl<T: SecretMatcher + ?Sized> SecretMatcher for Box<T> {
    fn match_secret(&self, password: &[u8]) -> Checked<MatchError> {
        (**self).match_secret(password)
    }
}

impl<T: SecretMatcher + ?Sized> SecretMatcher for Arc<T> {
    fn match_secret(&self, password: &[u8]) -> Checked<MatchError> {
        (**self).match_secret(password)
    }
}

/// Byte-for-byte comparison against a secret held in memory.
///
/// Reports the length of the common prefix. Passwords of a different length also carry
/// [`MatchError::LengthMismatch`], so a prefix of the secret never counts as a match.
#[derive(Debug, Clone)]
pub struct PlainSecret {
    secret: SecretText,
}

impl PlainSecret {
    pub fn new(secret: SecretText) -> Self {
        Self { secret }
    }
}

impl SecretMatcher for PlainSecret {
    fn match_secret(&self, password: &[u8]) -> Checked<MatchError> {
        let secret = self.secret.as_bytes();
        let matched = password
            .iter()
            .zip(secret)
            .take_while(|(a, b)| a == b)
            .count();

        if password.len() != secret.len() {
            return Checked::failed(matched, MatchError::LengthMismatch);
        }
        Checked::passed(matched)
    }
}

/// Comparison against the SHA-256 of the secret; the secret itself is never held.
#[derive(Clone, PartialEq, Eq)]
pub struct DigestSecret {
    digest: [u8; DIGEST_LEN],
}

impl DigestSecret {
    /// Hashes `secret` and keeps only the digest.
    pub fn from_secret(secret: &SecretText) -> Self {
        Self {
            digest: *PasswordDigest::of(secret.as_bytes()).as_bytes(),
        }
    }

    /// Parses a 64-character hex digest (either case).
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidDigest`] if `input` is not valid hex or not 32 bytes long.
    pub fn from_hex(input: &str) -> Result<Self, MatchError> {
        let bytes = hex::decode(input.trim())
            .map_err(|e| MatchError::InvalidDigest(e.to_string()))?;
        let digest: [u8; DIGEST_LEN] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            MatchError::InvalidDigest(format!(
                "expected {} bytes, got {}",
                DIGEST_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self { digest })
    }
}

impl std::fmt::Debug for DigestSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DigestSecret(<redacted>)")
    }
}

impl SecretMatcher for DigestSecret {
    fn match_secret(&self, password: &[u8]) -> Checked<MatchError> {
        if PasswordDigest::of(password).as_bytes() == &self.digest {
            Checked::passed(password.len())
        } else {
            Checked::passed(0)
        }
    }
}

/// The matcher selected by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredSecret {
    Plain(PlainSecret),
    Digest(DigestSecret),
}

impl SecretMatcher for ConfiguredSecret {
    fn match_secret(&self, password: &[u8]) -> Checked<MatchError> {
        match self {
            ConfiguredSecret::Plain(m) => m.match_secret(password),
            ConfiguredSecret::Digest(m) => m.match_secret(password),
        }
    }
}
