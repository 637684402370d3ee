//! Digest-to-UUID derivation.
//!
//! A flag token is a version 4, variant 1 UUID whose bytes come from the first 16 bytes of a
//! password digest rather than from a random source. Derivation is deterministic: the same 16
//! input bytes always yield the same token.
//!
//! ## Residue gate
//! Before any bits are rewritten, the first four input bytes are folded into a 32-bit value:
//!
//! `b0 << 24 ^ b1 << 16 ^ b2 << 8 ^ b3`
//!
//! and the value must leave a remainder of **2** when divided by **8** (half the UUID length).
//! Sources that miss the residue are rejected exactly like short or failing reads, so only a
//! fraction of digests ever produce a token.
//!
//! ## Layout
//! - byte 6: top nibble forced to `0100` (version 4)
//! - byte 8: top two bits forced to `10` (variant 1)
//! - text form: lower-case hex in groups of 4-2-2-2-6 bytes, joined by hyphens
//!
//! Example: `8b33498a-de6b-4bbb-9683-8c8df749b9ae`

mod service;

// Re-export public types
pub use service::{passes_residue_gate, DerivedUuid, Uuid, RESIDUE, UUID_LEN};

/// Error type for UUID derivation.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// The source was short, failed to read, or missed the residue gate
    #[error("error generating UUID")]
    Generation,
    /// Invalid textual input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
