//! Recurrence sweep binary
//!
//! Runs one generation sweep over a JSON schedule snapshot.
//!
//! # Usage
//!
//! ```bash
//! SWEEP_INPUT_PATH=schedule.json SWEEP_OUTPUT_PATH=result.json cargo run --bin recurrence-sweep
//! ```
//!
//! # Environment Variables
//!
//! * `SWEEP_INPUT_PATH` - Snapshot to read (default: schedule.json)
//! * `SWEEP_OUTPUT_PATH` - Result file; printed to stdout when unset
//! * `SWEEP_TIMEZONE` - Agency timezone that defines "today" (default: UTC)
//! * `SWEEP_NOW` - RFC 3339 instant to sweep as of (default: system time)
//! * `SWEEP_HONOR_DAYS_OF_WEEK` - Apply weekly weekday lists (default: true)
//! * `SWEEP_DEACTIVATE_PAST_END_DATE` - Stop templates past their end date (default: true)
//! * `SWEEP_INVOICE_NUMBER_PREFIX` - Prefix for new invoice numbers (default: INV)
//! * `SWEEP_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `SWEEP_LOG_FORMAT` - Log line format: text or json (default: text)

use anyhow::Context;
use interface_cli::{run, LogFormat, SweepConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = SweepConfig::from_env().context("loading SWEEP_* configuration")?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        input = %config.input_path.display(),
        timezone = %config.timezone,
        "Starting recurrence sweep"
    );

    let output = run(&config)
        .await
        .with_context(|| format!("sweeping {}", config.input_path.display()))?;

    if !output.report.is_clean() {
        tracing::warn!(
            failures = output.report.failures.len(),
            "Sweep finished with failures"
        );
    }
    Ok(())
}

/// Initializes the tracing subscriber; logs go to stderr so stdout stays JSON.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (text, json) = match format {
        LogFormat::Text => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
}
