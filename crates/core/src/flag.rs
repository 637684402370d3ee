//! The password-to-flag pipeline.
//!
//! Stages run in a fixed order and the first failure ends the attempt:
//! 1. rule validation ([`validate_password`])
//! 2. secret matching (the injected [`SecretMatcher`])
//! 3. SHA-256 of the password ([`PasswordDigest`])
//! 4. UUID derivation from the first 16 digest bytes ([`DerivedUuid`])
//! 5. wrapping in `flag{...}` ([`Flag::wrap`])

use crate::digest::PasswordDigest;
use crate::error::{FlagError, FlagResult};
use crate::matcher::SecretMatcher;
use crate::rules::validate_password;
use passflag_types::Flag;
use passflag_uuid::DerivedUuid;

/// Turns passwords into flags against one reference secret.
///
/// The service holds no per-attempt state; calls are independent of each other.
#[derive(Debug, Clone)]
pub struct FlagService<M> {
    matcher: M,
}

impl<M: SecretMatcher> FlagService<M> {
    /// Creates a service that checks passwords with `matcher`.
    pub fn new(matcher: M) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// Runs the full pipeline for one password.
    ///
    /// # Errors
    ///
    /// - [`FlagError::Rule`] for the first broken password rule
    /// - [`FlagError::IncorrectPassword`] if the matcher does not confirm every byte
    /// - [`FlagError::Derivation`] if the digest fails the UUID residue gate
    pub fn flag(&self, password: &[u8]) -> FlagResult<Flag> {
        flag(password, &self.matcher)
    }
}

/// Runs the full pipeline for one password against `matcher`.
///
/// See [`FlagService::flag`].
pub fn flag(password: &[u8], matcher: &impl SecretMatcher) -> FlagResult<Flag> {
    let scanned = validate_password(password).into_result().map_err(|violation| {
        tracing::debug!(len = password.len(), %violation, "password rejected by rules");
        FlagError::from(violation)
    })?;
    tracing::debug!(scanned, "password passed rules");

    let checked = matcher.match_secret(password);
    if !checked.is_full_match(password.len()) {
        match &checked.error {
            Some(error) => tracing::debug!(consumed = checked.consumed, %error, "secret match failed"),
            None => tracing::debug!(consumed = checked.consumed, "secret match was partial"),
        }
        return Err(FlagError::IncorrectPassword);
    }

    derive_flag(password)
}

/// Derives the flag for `password` without any rule or secret check.
///
/// Useful for working out which flag a chosen secret will unlock, and whether it clears the
/// residue gate at all.
///
/// # Errors
///
/// Returns [`FlagError::Derivation`] if the digest fails the residue gate.
pub fn derive_flag(password: &[u8]) -> FlagResult<Flag> {
    let digest = PasswordDigest::of(password);
    let uuid = DerivedUuid::from_reader(&digest.as_bytes()[..]).map_err(|e| {
        tracing::debug!(digest = %digest, "digest rejected by UUID builder");
        FlagError::from(e)
    })?;
    Ok(Flag::wrap(uuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Checked;
    use crate::matcher::{MatchError, PlainSecret};
    use crate::rules::RuleViolation;
    use passflag_types::SecretText;
    use std::cell::Cell;

    const SECRET: &str = "xY7?zQ";
    const SECRET_FLAG: &str = "flag{8b33498a-de6b-4bbb-9683-8c8df749b9ae}";

    fn service(secret: &str) -> FlagService<PlainSecret> {
        FlagService::new(PlainSecret::new(SecretText::new(secret).unwrap()))
    }

    /// Accepts everything and counts how often it was asked.
    #[derive(Default)]
    struct CountingMatcher {
        calls: Cell<usize>,
    }

    impl SecretMatcher for CountingMatcher {
        fn match_secret(&self, password: &[u8]) -> Checked<MatchError> {
            self.calls.set(self.calls.get() + 1);
            Checked::passed(password.len())
        }
    }

    /// Claims a full match but also reports an error.
    struct ErroringMatcher;

    impl SecretMatcher for ErroringMatcher {
        fn match_secret(&self, password: &[u8]) -> Checked<MatchError> {
            Checked::failed(password.len(), MatchError::InvalidDigest("store offline".into()))
        }
    }

    #[test]
    fn test_matching_password_yields_flag() {
        let flag = service(SECRET).flag(SECRET.as_bytes()).unwrap();
        assert_eq!(flag.as_str(), SECRET_FLAG);
        assert!(Flag::parse(flag.as_str()).is_ok());
    }

    #[test]
    fn test_flag_is_deterministic() {
        let service = service(SECRET);
        let first = service.flag(SECRET.as_bytes()).unwrap();
        let second = service.flag(SECRET.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rule_violation_reported_first() {
        match service("weird").flag(b"weird") {
            Err(FlagError::Rule(RuleViolation::IBeforeE)) => {}
            other => panic!("expected IBeforeE, got {other:?}"),
        }
    }

    #[test]
    fn test_matcher_not_called_on_rule_violation() {
        let matcher = CountingMatcher::default();
        let result = flag(b"aB1!", &matcher);

        assert!(matches!(result, Err(FlagError::Rule(RuleViolation::TooShort))));
        assert_eq!(matcher.calls.get(), 0);
    }

    #[test]
    fn test_matcher_called_once_after_rules_pass() {
        let matcher = CountingMatcher::default();
        let result = flag(SECRET.as_bytes(), &matcher);

        assert_eq!(result.unwrap().as_str(), SECRET_FLAG);
        assert_eq!(matcher.calls.get(), 1);
    }

    #[test]
    fn test_wrong_password_is_incorrect() {
        let result = service(SECRET).flag(b"aA1!bB2@");
        match result {
            Err(e @ FlagError::IncorrectPassword) => assert_eq!(e.to_string(), "incorrect password"),
            other => panic!("expected IncorrectPassword, got {other:?}"),
        }
    }

    #[test]
    fn test_matcher_error_is_incorrect_even_with_full_count() {
        let result = flag(SECRET.as_bytes(), &ErroringMatcher);
        assert!(matches!(result, Err(FlagError::IncorrectPassword)));
    }

    #[test]
    fn test_residue_miss_is_derivation_error() {
        // Valid and matching, but SHA-256("aA1!bB2@") folds to a residue of 7.
        let result = service("aA1!bB2@").flag(b"aA1!bB2@");
        match result {
            Err(e @ FlagError::Derivation(_)) => assert_eq!(e.to_string(), "error generating UUID"),
            other => panic!("expected Derivation, got {other:?}"),
        }
    }

    #[test]
    fn test_rule_error_message_is_passed_through() {
        let err = service(SECRET).flag("a🔓".as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot contain 🔓 because open locks are super insecure"
        );
    }

    #[test]
    fn test_derive_flag_skips_checks() {
        assert_eq!(derive_flag(SECRET.as_bytes()).unwrap().as_str(), SECRET_FLAG);
        // Digest gate only; the secret is never consulted.
        assert!(matches!(derive_flag(b"aA1!bB2@"), Err(FlagError::Derivation(_))));
    }

    #[test]
    fn test_flag_carries_version_and_variant() {
        let flag = service(SECRET).flag(SECRET.as_bytes()).unwrap();
        let uuid = DerivedUuid::parse(flag.token()).unwrap();
        assert_eq!(uuid.as_bytes()[6] >> 4, 0b0100);
        assert_eq!(uuid.as_bytes()[8] >> 6, 0b10);
    }
}
