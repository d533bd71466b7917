//! Logging setup
//!
//! One `tracing` subscriber for the process, as human-readable text or
//! JSON lines.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the logging system
///
/// - `RUST_LOG` wins over the configured level when set
/// - JSON output flattens event fields for cleaner log lines
///
/// Calling this more than once keeps the first subscriber.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if config.json {
        fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .try_init()
    } else {
        fmt().with_env_filter(filter).with_target(false).try_init()
    };

    if let Err(e) = result {
        tracing::debug!("Logging already initialized: {e}");
    }
}
