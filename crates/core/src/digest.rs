//! SHA-256 digests of passwords.

use sha2::{Digest, Sha256};
use std::fmt;

/// Size of a password digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// SHA-256 of the exact password bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PasswordDigest([u8; DIGEST_LEN]);

impl PasswordDigest {
    /// Hashes `password` as given; no normalisation is applied.
    pub fn of(password: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(password);
        let hash_array: [u8; DIGEST_LEN] = hasher.finalize().into();
        Self(hash_array)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lower-case hex encoding (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for PasswordDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordDigest({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let digest = PasswordDigest::of(b"xY7?zQ");
        assert_eq!(
            digest.to_string(),
            "8b33498ade6b5bbb56838c8df749b9aedb2074ab0afcd52dcde008b455029a78"
        );
    }

    #[test]
    fn test_empty_input_digest() {
        assert_eq!(
            PasswordDigest::of(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_single_byte_change_changes_digest() {
        assert_ne!(PasswordDigest::of(b"xY7?zQ"), PasswordDigest::of(b"xY7?zR"));
    }
}
