//! Tracing subscriber setup for binaries embedding the catalog.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Filter used when the configured level cannot be parsed.
const FALLBACK_FILTER: &str = "debug";

/// ## Summary
/// Installs the global `tracing` subscriber using `config.level` as an
/// `EnvFilter` directive.
///
/// An unparsable directive falls back to `debug` and is reported once the
/// subscriber is live.
///
/// ## Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let (filter, rejected) = match EnvFilter::try_new(config.level.as_str()) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(FALLBACK_FILTER), Some(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()?;

    if let Some(e) = rejected {
        tracing::warn!(level = %config.level, error = %e, "Invalid log level in config, using debug");
    }

    Ok(())
}
