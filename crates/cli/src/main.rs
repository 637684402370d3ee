use clap::{Args, Parser, Subcommand};
use passflag_core::{
    config::{max_attempts_from_env_value, resolve_secret},
    derive_flag, run_loop, validate_password, DerivedUuid, Flag, FlagService, PasswordDigest,
    SecretSources,
};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "passflag")]
#[command(about = "Trade a password for its flag")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where to find the reference secret. Falls back to the `PASSFLAG_SECRET*` environment
/// variables when none of these is given.
#[derive(Args)]
struct SecretArgs {
    /// Reference secret
    #[arg(long)]
    secret: Option<String>,
    /// Hex SHA-256 of the reference secret
    #[arg(long)]
    secret_sha256: Option<String>,
    /// File holding the reference secret
    #[arg(long)]
    secret_file: Option<PathBuf>,
}

impl SecretArgs {
    fn sources(self) -> SecretSources {
        let given = SecretSources {
            plain: self.secret,
            sha256: self.secret_sha256,
            file: self.secret_file,
        };
        if given.is_empty() {
            SecretSources::from_env()
        } else {
            given
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full check and print the flag
    Check {
        /// Candidate password
        password: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        secret: SecretArgs,
    },
    /// Check the password rules only
    Validate {
        /// Candidate password
        password: String,
    },
    /// Show the digest and flag a password would unlock, ignoring rules and secret
    Derive {
        /// Password to derive from
        password: String,
    },
    /// Check that a string is a well-formed flag
    Verify {
        /// Flag to check, e.g. flag{8b33498a-de6b-4bbb-9683-8c8df749b9ae}
        flag: String,
    },
    /// Prompt for passwords on stdin until end of input
    Play {
        /// Stop after this many attempts (default: PASSFLAG_MAX_ATTEMPTS, else unbounded)
        #[arg(long)]
        max_attempts: Option<NonZeroUsize>,
        #[command(flatten)]
        secret: SecretArgs,
    },
}

/// Machine-readable result of `check --json`.
#[derive(serde::Serialize)]
struct CheckReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    flag: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Check {
            password,
            json,
            secret,
        }) => {
            let service = FlagService::new(resolve_secret(secret.sources())?);
            let result = service.flag(password.as_bytes());

            if json {
                let report = match &result {
                    Ok(flag) => CheckReport {
                        flag: Some(flag.clone()),
                        error: None,
                    },
                    Err(e) => CheckReport {
                        flag: None,
                        error: Some(e.to_string()),
                    },
                };
                println!("{}", serde_json::to_string(&report)?);
            } else {
                match &result {
                    Ok(flag) => println!("{}", flag),
                    Err(e) => eprintln!("{}", e),
                }
            }

            if result.is_err() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(Commands::Validate { password }) => {
            let checked = validate_password(password.as_bytes());
            match checked.into_result() {
                Ok(scanned) => println!("ok ({} bytes)", scanned),
                Err(violation) => {
                    eprintln!("{}", violation);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Some(Commands::Derive { password }) => {
            println!("digest: {}", PasswordDigest::of(password.as_bytes()));
            match derive_flag(password.as_bytes()) {
                Ok(flag) => println!("{}", flag),
                Err(e) => {
                    eprintln!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Some(Commands::Verify { flag }) => {
            let verified = Flag::parse(&flag)
                .map_err(|e| e.to_string())
                .and_then(|flag| DerivedUuid::parse(flag.token()).map_err(|e| e.to_string()));
            match verified {
                Ok(uuid) => println!("valid flag (uuid {})", uuid),
                Err(e) => {
                    eprintln!("invalid flag: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Some(Commands::Play {
            max_attempts,
            secret,
        }) => {
            let max_attempts = match max_attempts {
                Some(max) => Some(max),
                None => max_attempts_from_env_value(
                    std::env::var(passflag_core::constants::MAX_ATTEMPTS_ENV).ok(),
                )?,
            };
            let service = FlagService::new(resolve_secret(secret.sources())?);
            let summary = run_loop(
                &service,
                std::io::stdin().lock(),
                std::io::stdout().lock(),
                max_attempts,
            )?;
            eprintln!(
                "{} attempt(s), {} flag(s)",
                summary.attempts, summary.flags
            );
        }
        None => {
            println!("Use 'passflag --help' for commands");
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_parses_secret_flags() {
        let cli = Cli::try_parse_from([
            "passflag",
            "check",
            "xY7?zQ",
            "--json",
            "--secret",
            "xY7?zQ",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Check {
                password,
                json,
                secret,
            }) => {
                assert_eq!(password, "xY7?zQ");
                assert!(json);
                let sources = secret.sources();
                assert_eq!(sources.plain.as_deref(), Some("xY7?zQ"));
                assert!(sources.sha256.is_none());
            }
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn test_play_rejects_zero_attempts() {
        let result = Cli::try_parse_from(["passflag", "play", "--max-attempts", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_report_json_shape() {
        let ok = CheckReport {
            flag: Some(Flag::parse("flag{8b33498a-de6b-4bbb-9683-8c8df749b9ae}").unwrap()),
            error: None,
        };
        assert_eq!(
            serde_json::to_string(&ok).unwrap(),
            r#"{"flag":"flag{8b33498a-de6b-4bbb-9683-8c8df749b9ae}"}"#
        );

        let err = CheckReport {
            flag: None,
            error: Some("incorrect password".into()),
        };
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"error":"incorrect password"}"#
        );
    }
}
