//! Structured logging setup.

use crate::LoggingConfig;
use kevimage_error::{ConfigError, KevimageResult};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `config.level` is used, raised to
/// `debug` when `verbose` is set. Output is human-readable text, or JSON lines
/// when `config.json` is set.
///
/// # Errors
///
/// Returns a config error if the level is not a valid filter or a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> KevimageResult<()> {
    let level = if verbose { "debug" } else { config.level.as_str() };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| ConfigError::new(format!("Invalid log level '{}': {}", level, e)))?;

    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(verbose)
            .with_line_number(verbose)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install log subscriber: {}", e)))?;

    Ok(())
}
