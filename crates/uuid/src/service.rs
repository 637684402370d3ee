//! Internal implementation of the UUID builder.

use crate::{UuidError, UuidResult};
use std::io::Read;
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Number of bytes consumed from a source.
pub const UUID_LEN: usize = 16;

/// Remainder the folded first word must leave modulo `UUID_LEN / 2`.
pub const RESIDUE: u32 = 2;

/// Length of the hyphenated text form.
const HYPHENATED_LEN: usize = 36;

/// Byte offsets of the hyphens in the text form.
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Returns true if the first four bytes of `bytes` satisfy the residue gate.
///
/// Bytes 0 to 3 are never rewritten by derivation, so this holds for both the source bytes
/// and a finished [`DerivedUuid`].
pub fn passes_residue_gate(bytes: &[u8; UUID_LEN]) -> bool {
    let folded = (bytes[0] as u32) << 24
        ^ (bytes[1] as u32) << 16
        ^ (bytes[2] as u32) << 8
        ^ bytes[3] as u32;
    folded % (UUID_LEN as u32 / 2) == RESIDUE
}

/// A version 4, variant 1 UUID derived from digest bytes.
///
/// Once constructed, the inner value is guaranteed to have passed the residue gate and to carry
/// the forced version and variant bits.
///
/// # Construction
/// - [`DerivedUuid::from_reader`] consumes exactly [`UUID_LEN`] bytes from a byte source.
/// - [`DerivedUuid::from_bytes`] derives from an in-memory block.
/// - [`DerivedUuid::parse`] validates a token that was produced earlier.
///
/// # Display format
/// Lower-case hyphenated, e.g. `8b33498a-de6b-4bbb-9683-8c8df749b9ae`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DerivedUuid(Uuid);

impl DerivedUuid {
    /// Reads exactly [`UUID_LEN`] bytes from `reader` and derives a UUID from them.
    ///
    /// Bytes after the first [`UUID_LEN`] are left unread.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::Generation`] if the source holds fewer than [`UUID_LEN`] bytes, the
    /// read fails, or the bytes miss the residue gate.
    pub fn from_reader(mut reader: impl Read) -> UuidResult<Self> {
        let mut block = [0u8; UUID_LEN];
        reader
            .read_exact(&mut block)
            .map_err(|_| UuidError::Generation)?;
        Self::from_bytes(block)
    }

    /// Derives a UUID from a 16-byte block.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::Generation`] if the block misses the residue gate.
    pub fn from_bytes(mut block: [u8; UUID_LEN]) -> UuidResult<Self> {
        if !passes_residue_gate(&block) {
            return Err(UuidError::Generation);
        }

        // Top two bits of byte 8 become 10: variant 1.
        block[8] = (block[8] & 0b0011_1111) | 0b1000_0000;
        // Top four bits of byte 6 become 0100: version 4.
        block[6] = (block[6] & 0b0000_1111) | 0b0100_0000;

        Ok(Self(Uuid::from_bytes(block)))
    }

    /// Validates a token in lower-case hyphenated form that could have come out of derivation.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not canonical, does not carry the
    /// version 4 and variant 1 bits, or misses the residue gate.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "UUID must be 36 lowercase hex characters with hyphens, got: '{}'",
                input
            )));
        }

        let uuid = Uuid::parse_str(input)
            .map_err(|e| UuidError::InvalidInput(format!("'{}': {}", input, e)))?;

        if uuid.get_version_num() != 4 || uuid.get_variant() != ::uuid::Variant::RFC4122 {
            return Err(UuidError::InvalidInput(format!(
                "UUID must be version 4, variant 1, got: '{}'",
                input
            )));
        }

        if !passes_residue_gate(uuid.as_bytes()) {
            return Err(UuidError::InvalidInput(format!(
                "UUID could not have been derived (residue gate), got: '{}'",
                input
            )));
        }

        Ok(Self(uuid))
    }

    /// Returns true if `input` is in lower-case hyphenated form.
    ///
    /// Purely syntactic: 36 bytes, hyphens at positions 8, 13, 18 and 23, `0-9`/`a-f`
    /// everywhere else.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == HYPHENATED_LEN
            && input.bytes().enumerate().all(|(i, b)| {
                if HYPHEN_POSITIONS.contains(&i) {
                    b == b'-'
                } else {
                    matches!(b, b'0'..=b'9' | b'a'..=b'f')
                }
            })
    }

    /// Returns the UUID as a `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; UUID_LEN] {
        self.0.as_bytes()
    }
}

impl fmt::Display for DerivedUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for DerivedUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DerivedUuid::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DerivedUuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DerivedUuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DerivedUuid::parse(&s).map_err(serde::de::Error::custom)
    }
}
