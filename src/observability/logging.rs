//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber
//! - Pick the log level from `RUST_LOG`, falling back to configuration
//! - Toggle timestamps on log lines

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Build the level filter: `RUST_LOG` when set, otherwise `nats_http_bridge`
/// at the configured level.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nats_http_bridge={},warn", config.log_level)))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(
    config: &ObservabilityConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let timed = config.show_timestamps.then(|| fmt::layer());
    let untimed = (!config.show_timestamps).then(|| fmt::layer().without_time());

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(timed)
        .with(untimed)
        .try_init()
}
