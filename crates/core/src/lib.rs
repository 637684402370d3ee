//! # passflag core
//!
//! Turns a password into a flag of the form `flag{<uuid>}`.
//!
//! An attempt passes through, in order:
//! - the syntactic rule check ([`rules`])
//! - a reference secret check through an injected [`SecretMatcher`] ([`matcher`])
//! - SHA-256 of the password ([`digest`])
//! - UUID derivation from the first 16 digest bytes (`passflag-uuid`)
//!
//! Every stage is a pure computation over the password bytes. The first failing stage ends the
//! attempt with a [`FlagError`].
//!
//! **No I/O concerns** beyond [`interaction`], which drives the pipeline from a line reader, and
//! [`config`], which resolves the secret once at startup.

pub mod check;
pub mod config;
pub mod constants;
pub mod digest;
pub mod error;
pub mod flag;
pub mod interaction;
pub mod matcher;
pub mod rules;

pub use check::Checked;
pub use config::{ConfigError, ConfigResult, CoreConfig, SecretSources};
pub use digest::PasswordDigest;
pub use error::{FlagError, FlagResult};
pub use flag::{derive_flag, flag, FlagService};
pub use interaction::{run_loop, LoopSummary};
pub use matcher::{ConfiguredSecret, DigestSecret, MatchError, PlainSecret, SecretMatcher};
pub use rules::{validate_password, RuleViolation};

pub use passflag_types::{Flag, Password, SecretText};
pub use passflag_uuid::DerivedUuid;
