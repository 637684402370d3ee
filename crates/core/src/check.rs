//! Outcome type shared by the password checks.
//!
//! The rule validator and every secret matcher report the same shape: how many bytes of the
//! password they consumed, plus the error that stopped them, if any.

/// Result of running one check over a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checked<E> {
    /// Bytes consumed before the decision was made.
    pub consumed: usize,
    /// The error that ended the check, if any.
    pub error: Option<E>,
}

impl<E> Checked<E> {
    pub fn passed(consumed: usize) -> Self {
        Self {
            consumed,
            error: None,
        }
    }

    pub fn failed(consumed: usize, error: E) -> Self {
        Self {
            consumed,
            error: Some(error),
        }
    }

    /// True when there is no error and every one of `len` bytes was consumed.
    pub fn is_full_match(&self, len: usize) -> bool {
        self.error.is_none() && self.consumed == len
    }

    /// Converts into a `Result` carrying the consumed byte count on success.
    pub fn into_result(self) -> Result<usize, E> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.consumed),
        }
    }
}
