//! Structured logging setup.
//!
//! The library only emits `tracing` events; binaries and tests that want to
//! see them call [`init_logging`] once. `RUST_LOG` takes precedence over the
//! configured level.

use crate::config::LoggingConfig;
use crate::error::{PassdbError, Result};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber for the given configuration.
///
/// Fails with `ConfigError` if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_ascii_lowercase()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| PassdbError::ConfigError(format!("Failed to install logger: {e}")))?;
    tracing::debug!(app = %config.app_name, "Logging initialized");
    Ok(())
}

/// Like [`init_logging`] but ignores an already installed subscriber.
pub fn try_init_logging(config: &LoggingConfig) {
    let _ = init_logging(config);
}
