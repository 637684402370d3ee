//! Syntactic password rules.
//!
//! A password is scanned once, left to right, as a sequence of codepoints. Per-character rules
//! are checked in a fixed order and the scan stops at the first one that fires. Character-class
//! and length rules are checked after the scan, so a short password that is also missing a class
//! reports the missing class.
//!
//! Bytes that are not valid UTF-8 are scanned as one U+FFFD per byte.

use crate::check::Checked;
use crate::constants::{FORBIDDEN_CHAR, MIN_PASSWORD_LEN};

/// A broken password rule. Messages are shown to the user verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("cannot contain 🔓 because open locks are super insecure")]
    ForbiddenCharacter,
    #[error("cannot contain the same character twice in a row because Fannee Doolee likes insecure passwords")]
    RepeatedCharacter,
    #[error("i before e except after c")]
    IBeforeE,
    #[error("must contain at least one upper-case letter")]
    MissingUpper,
    #[error("must contain at least one lower-case letter")]
    MissingLower,
    #[error("must contain at least one digit")]
    MissingDigit,
    #[error("must contain at least one punctuation character")]
    MissingPunctuation,
    #[error("must be at least 6 bytes long")]
    TooShort,
}

/// Scan state for one validation call.
#[derive(Debug, Default)]
struct RuleState {
    /// `prev[1]` is the codepoint just before the current one, `prev[0]` the one before that.
    prev: [char; 2],
    has_upper: bool,
    has_lower: bool,
    has_digit: bool,
    has_punct: bool,
}

impl RuleState {
    fn step(&mut self, c: char) -> Result<(), RuleViolation> {
        if c == FORBIDDEN_CHAR {
            return Err(RuleViolation::ForbiddenCharacter);
        }
        if c == self.prev[1] {
            return Err(RuleViolation::RepeatedCharacter);
        }
        if c == 'i' && self.prev[1] == 'e' && !matches!(self.prev[0], 'c' | 'C') {
            return Err(RuleViolation::IBeforeE);
        }

        self.prev = [self.prev[1], c];

        match c {
            'A'..='Z' => self.has_upper = true,
            'a'..='z' => self.has_lower = true,
            '0'..='9' => self.has_digit = true,
            '!'..='/' | ':'..='@' | '['..='`' | '{'..='~' => self.has_punct = true,
            _ => {}
        }

        Ok(())
    }

    fn finish(&self, len: usize) -> Result<(), RuleViolation> {
        if !self.has_upper {
            return Err(RuleViolation::MissingUpper);
        }
        if !self.has_lower {
            return Err(RuleViolation::MissingLower);
        }
        if !self.has_digit {
            return Err(RuleViolation::MissingDigit);
        }
        if !self.has_punct {
            return Err(RuleViolation::MissingPunctuation);
        }
        if len < MIN_PASSWORD_LEN {
            return Err(RuleViolation::TooShort);
        }
        Ok(())
    }
}

/// Decodes `bytes` into `(codepoint, byte width)` pairs.
fn codepoints(bytes: &[u8]) -> impl Iterator<Item = (char, usize)> + '_ {
    bytes.utf8_chunks().flat_map(|chunk| {
        chunk
            .valid()
            .chars()
            .map(|c| (c, c.len_utf8()))
            .chain(
                chunk
                    .invalid()
                    .iter()
                    .map(|_| (char::REPLACEMENT_CHARACTER, 1)),
            )
    })
}

/// Checks `password` against every rule.
///
/// The returned [`Checked`] carries the number of bytes scanned: on success this is the full
/// length; on a per-character violation it includes the offending codepoint.
pub fn validate_password(password: &[u8]) -> Checked<RuleViolation> {
    let mut state = RuleState::default();
    let mut scanned = 0;

    for (c, width) in codepoints(password) {
        scanned += width;
        if let Err(violation) = state.step(c) {
            return Checked::failed(scanned, violation);
        }
    }

    match state.finish(password.len()) {
        Ok(()) => Checked::passed(scanned),
        Err(violation) => Checked::failed(scanned, violation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(password: &[u8]) -> Option<RuleViolation> {
        validate_password(password).error
    }

    #[test]
    fn test_valid_password_passes() {
        let checked = validate_password(b"aA1!bB2@");
        assert_eq!(checked, Checked::passed(8));
    }

    #[test]
    fn test_shortest_valid_password() {
        assert_eq!(validate_password(b"xY7?zQ"), Checked::passed(6));
    }

    #[test]
    fn test_too_short_with_all_classes() {
        let checked = validate_password(b"aB1!");
        assert_eq!(checked, Checked::failed(4, RuleViolation::TooShort));

        assert_eq!(violation(b"aB1!c"), Some(RuleViolation::TooShort));
    }

    #[test]
    fn test_class_error_reported_before_length() {
        assert_eq!(violation(b"aB1"), Some(RuleViolation::MissingPunctuation));
        assert_eq!(violation(b"a"), Some(RuleViolation::MissingUpper));
        assert_eq!(violation(b""), Some(RuleViolation::MissingUpper));
    }

    #[test]
    fn test_class_checks_in_order() {
        assert_eq!(violation(b"123456"), Some(RuleViolation::MissingUpper));
        assert_eq!(violation(b"ABCDEF"), Some(RuleViolation::MissingLower));
        assert_eq!(violation(b"ABCdef"), Some(RuleViolation::MissingDigit));
        assert_eq!(violation(b"ABc12d"), Some(RuleViolation::MissingPunctuation));
    }

    #[test]
    fn test_punctuation_ranges() {
        for punct in ["!", "/", ":", "@", "[", "`", "{", "~"] {
            let password = format!("aB1{punct}xy");
            assert_eq!(
                validate_password(password.as_bytes()),
                Checked::passed(6),
                "'{punct}' should count as punctuation"
            );
        }
    }

    #[test]
    fn test_space_and_non_ascii_are_not_punctuation() {
        assert_eq!(violation(b"aB1 xyz"), Some(RuleViolation::MissingPunctuation));
        assert_eq!(
            violation("aB1£xyz".as_bytes()),
            Some(RuleViolation::MissingPunctuation)
        );
    }

    #[test]
    fn test_forbidden_character_fails_immediately() {
        let checked = validate_password("a🔓".as_bytes());
        assert_eq!(checked, Checked::failed(5, RuleViolation::ForbiddenCharacter));

        assert_eq!(
            violation("aA1!bB2@🔓".as_bytes()),
            Some(RuleViolation::ForbiddenCharacter)
        );
    }

    #[test]
    fn test_forbidden_character_checked_before_repeat() {
        let checked = validate_password("🔓🔓".as_bytes());
        assert_eq!(checked, Checked::failed(4, RuleViolation::ForbiddenCharacter));
    }

    #[test]
    fn test_adjacent_repeat_fails() {
        let checked = validate_password(b"aA1!!bB2");
        assert_eq!(checked, Checked::failed(5, RuleViolation::RepeatedCharacter));
        assert_eq!(violation("ééA1!".as_bytes()), Some(RuleViolation::RepeatedCharacter));
    }

    #[test]
    fn test_repeat_checked_before_forbidden_later_in_password() {
        assert_eq!(violation("aa🔓".as_bytes()), Some(RuleViolation::RepeatedCharacter));
    }

    #[test]
    fn test_non_adjacent_repeat_is_allowed() {
        assert_eq!(validate_password(b"aA1!aA1!"), Checked::passed(8));
    }

    #[test]
    fn test_leading_nul_counts_as_repeat() {
        let checked = validate_password(b"\0aB1!xy");
        assert_eq!(checked, Checked::failed(1, RuleViolation::RepeatedCharacter));
    }

    #[test]
    fn test_i_before_e_rule() {
        let checked = validate_password(b"weird");
        assert_eq!(checked, Checked::failed(3, RuleViolation::IBeforeE));

        assert_eq!(violation(b"Theirs1!"), Some(RuleViolation::IBeforeE));
        assert_eq!(violation(b"ei"), Some(RuleViolation::IBeforeE));
    }

    #[test]
    fn test_i_before_e_allowed_after_c() {
        assert_eq!(violation(b"ceiling"), Some(RuleViolation::MissingUpper));
        assert_eq!(validate_password(b"Ceiling!1"), Checked::passed(9));
        assert_eq!(validate_password(b"reCeipt!1"), Checked::passed(9));
    }

    #[test]
    fn test_i_before_e_is_case_sensitive_on_i_and_e() {
        assert_eq!(validate_password(b"wEird!1"), Checked::passed(7));
        assert_eq!(validate_password(b"weIrd!1"), Checked::passed(7));
    }

    #[test]
    fn test_invalid_utf8_byte_scanned_as_replacement() {
        assert_eq!(validate_password(b"\xffaB1!xy"), Checked::passed(7));
    }

    #[test]
    fn test_adjacent_invalid_bytes_repeat() {
        let checked = validate_password(b"\xff\xfeaB1!x");
        assert_eq!(checked, Checked::failed(2, RuleViolation::RepeatedCharacter));
    }

    #[test]
    fn test_length_counts_bytes_not_codepoints() {
        // Five codepoints, six bytes.
        assert_eq!(validate_password("aB1!é".as_bytes()), Checked::passed(6));
    }

    #[test]
    fn test_messages_are_verbatim() {
        assert_eq!(
            RuleViolation::ForbiddenCharacter.to_string(),
            "cannot contain 🔓 because open locks are super insecure"
        );
        assert_eq!(
            RuleViolation::RepeatedCharacter.to_string(),
            "cannot contain the same character twice in a row because Fannee Doolee likes insecure passwords"
        );
        assert_eq!(RuleViolation::TooShort.to_string(), "must be at least 6 bytes long");
    }
}
