//! Subscriber setup for the binary. Library code only emits events.

use crate::core::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LABGEN_LOG";

/// `LABGEN_LOG` wins over the configured level. Output always goes to
/// stderr so stdout stays machine-readable.
pub fn filter_for(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init_logging(config: &LoggingConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_for(config))
        .with_writer(std::io::stderr)
        .with_target(false);
    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if result.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
