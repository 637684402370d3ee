use crate::rules::RuleViolation;

/// Why no flag was produced for an attempt.
///
/// Every variant is recoverable: the caller reports the message and may try again.
#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),
    #[error("incorrect password")]
    IncorrectPassword,
    #[error(transparent)]
    Derivation(#[from] passflag_uuid::UuidError),
}

pub type FlagResult<T> = std::result::Result<T, FlagError>;
