//! Logging setup - tracing subscriber installation
//!
//! Services emit `tracing` events; binaries call [`init`] once at startup.
//! Output goes to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::domain::result::{Error, Result};

/// Build the filter from `RUST_LOG` if set, else from the configured level
fn build_env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    // Keep third-party crates quiet unless asked for explicitly
    let directives = [level, "hyper=warn", "h2=warn"].join(",");
    EnvFilter::try_new(&directives)
        .map_err(|e| Error::Config(format!("Invalid tracing filter '{}': {}", directives, e)))
}

/// Install the global subscriber
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(&config.level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if installed.is_ok() {
        tracing::trace!(level = %config.level, format = ?config.format, "logging initialized");
    }
    Ok(())
}
