//! Tracing subscriber setup from `LoggingConfig`

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;
use wss_core::{LogFormat, LoggingConfig};

/// Install the global subscriber. `RUST_LOG` wins over the configured levels.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.filter_directives())?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(config.file_line)
        .with_line_number(config.file_line);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
}
