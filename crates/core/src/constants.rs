//! Constants used throughout the passflag core crate.

/// Minimum accepted password length, in bytes.
pub const MIN_PASSWORD_LEN: usize = 6;

/// The one codepoint a password may never contain (U+1F513, open lock).
pub const FORBIDDEN_CHAR: char = '\u{1F513}';

/// Environment variable holding the plain reference secret.
pub const SECRET_ENV: &str = "PASSFLAG_SECRET";

/// Environment variable holding the hex SHA-256 of the reference secret.
pub const SECRET_SHA256_ENV: &str = "PASSFLAG_SECRET_SHA256";

/// Environment variable naming a file whose contents are the reference secret.
pub const SECRET_FILE_ENV: &str = "PASSFLAG_SECRET_FILE";

/// Environment variable bounding the number of interactive attempts.
pub const MAX_ATTEMPTS_ENV: &str = "PASSFLAG_MAX_ATTEMPTS";

/// Prompt printed before each interactive attempt.
pub const PROMPT: &str = "Enter password:";
