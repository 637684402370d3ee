use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passflag_core::{run_loop, CoreConfig};

/// Main entry point for the passflag prompt loop
///
/// Reads one password per line from stdin and prints the flag or the reason it was refused.
/// Refused attempts do not end the loop; end of input or the attempt limit does.
///
/// # Environment Variables
/// - `PASSFLAG_SECRET`: reference secret
/// - `PASSFLAG_SECRET_SHA256`: hex SHA-256 of the reference secret (alternative)
/// - `PASSFLAG_SECRET_FILE`: file holding the reference secret (alternative)
/// - `PASSFLAG_MAX_ATTEMPTS`: stop after this many attempts (default: until end of input)
///
/// # Returns
/// * `Ok(())` - If input ran out or the attempt limit was reached
/// * `Err(anyhow::Error)` - If configuration is invalid or stdin/stdout fail
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("passflag=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CoreConfig::from_env()?;
    let max_attempts = config.max_attempts();

    tracing::info!(?max_attempts, "++ Starting passflag");

    let service = config.into_service();
    let summary = run_loop(
        &service,
        std::io::stdin().lock(),
        std::io::stdout().lock(),
        max_attempts,
    )?;

    tracing::info!(
        attempts = summary.attempts,
        flags = summary.flags,
        failures = summary.failures(),
        "-- passflag finished"
    );

    Ok(())
}
