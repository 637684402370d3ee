//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the flag service.
//! Nothing in the pipeline reads environment variables while handling an attempt.

use crate::constants::{MAX_ATTEMPTS_ENV, SECRET_ENV, SECRET_FILE_ENV, SECRET_SHA256_ENV};
use crate::flag::FlagService;
use crate::matcher::{ConfiguredSecret, DigestSecret, MatchError, PlainSecret};
use passflag_types::SecretText;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidInput(String),
    #[error(
        "failed to read secret file (path: {path}): {source}",
        path = path.display()
    )]
    SecretFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    SecretDigest(#[from] MatchError),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// The places a reference secret may come from. Exactly one must be set.
#[derive(Debug, Clone, Default)]
pub struct SecretSources {
    /// The secret itself.
    pub plain: Option<String>,
    /// Hex SHA-256 of the secret.
    pub sha256: Option<String>,
    /// File holding the secret.
    pub file: Option<PathBuf>,
}

impl SecretSources {
    /// Reads the secret variables from the process environment.
    ///
    /// Call this at startup only.
    pub fn from_env() -> Self {
        Self {
            plain: std::env::var(SECRET_ENV).ok(),
            sha256: std::env::var(SECRET_SHA256_ENV).ok(),
            file: std::env::var_os(SECRET_FILE_ENV).map(PathBuf::from),
        }
    }

    /// True when no source is set at all.
    pub fn is_empty(&self) -> bool {
        self.plain.is_none() && self.sha256.is_none() && self.file.is_none()
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    secret: ConfiguredSecret,
    max_attempts: Option<NonZeroUsize>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(secret: ConfiguredSecret, max_attempts: Option<NonZeroUsize>) -> Self {
        Self {
            secret,
            max_attempts,
        }
    }

    /// Resolve configuration from secret sources and a raw max-attempts value.
    pub fn from_sources(
        sources: SecretSources,
        max_attempts: Option<String>,
    ) -> ConfigResult<Self> {
        Ok(Self::new(
            resolve_secret(sources)?,
            max_attempts_from_env_value(max_attempts)?,
        ))
    }

    /// Resolve configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_sources(SecretSources::from_env(), std::env::var(MAX_ATTEMPTS_ENV).ok())
    }

    pub fn secret(&self) -> &ConfiguredSecret {
        &self.secret
    }

    pub fn max_attempts(&self) -> Option<NonZeroUsize> {
        self.max_attempts
    }

    /// Builds the flag service for this configuration.
    pub fn into_service(self) -> FlagService<ConfiguredSecret> {
        FlagService::new(self.secret)
    }
}

/// Picks the single configured secret source and builds its matcher.
///
/// Empty values count as unset. Plain and file secrets are used byte for byte, except that one
/// trailing line ending is removed from file contents.
pub fn resolve_secret(sources: SecretSources) -> ConfigResult<ConfiguredSecret> {
    let plain = sources.plain.filter(|v| !v.is_empty());
    let sha256 = sources
        .sha256
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let file = sources.file.filter(|p| !p.as_os_str().is_empty());

    let set = [plain.is_some(), sha256.is_some(), file.is_some()]
        .iter()
        .filter(|s| **s)
        .count();
    if set > 1 {
        return Err(ConfigError::InvalidInput(format!(
            "only one of {SECRET_ENV}, {SECRET_SHA256_ENV}, {SECRET_FILE_ENV} may be set"
        )));
    }

    if let Some(plain) = plain {
        return Ok(ConfiguredSecret::Plain(PlainSecret::new(secret_text(
            plain.into_bytes(),
        )?)));
    }
    if let Some(hex) = sha256 {
        return Ok(ConfiguredSecret::Digest(DigestSecret::from_hex(&hex)?));
    }
    if let Some(path) = file {
        let bytes = read_secret_file(&path)?;
        return Ok(ConfiguredSecret::Plain(PlainSecret::new(secret_text(bytes)?)));
    }

    Err(ConfigError::InvalidInput(format!(
        "no secret configured (set {SECRET_ENV}, {SECRET_SHA256_ENV} or {SECRET_FILE_ENV})"
    )))
}

fn secret_text(bytes: Vec<u8>) -> ConfigResult<SecretText> {
    SecretText::new(bytes)
        .map_err(|_| ConfigError::InvalidInput("secret cannot be empty".into()))
}

fn read_secret_file(path: &Path) -> ConfigResult<Vec<u8>> {
    let mut bytes = std::fs::read(path).map_err(|source| ConfigError::SecretFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.ends_with(b"\n") {
        bytes.pop();
        if bytes.ends_with(b"\r") {
            bytes.pop();
        }
    }
    Ok(bytes)
}

/// Parse the attempt bound from an optional string value.
///
/// If `value` is `None` or empty/whitespace, the loop is unbounded (it still ends at end of
/// input).
pub fn max_attempts_from_env_value(value: Option<String>) -> ConfigResult<Option<NonZeroUsize>> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    value
        .map(|v| {
            v.parse::<NonZeroUsize>().map_err(|_| {
                ConfigError::InvalidInput(format!(
                    "{MAX_ATTEMPTS_ENV} must be a positive integer, got: '{v}'"
                ))
            })
        })
        .transpose()
}
