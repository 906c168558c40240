//! Configuration loading from disk.

use crate::config::schema::TraceConfig;
use std::path::Path;
use thiserror::Error;

/// Error type for configuration loading.
///
/// Surfaced immediately to the caller; an invalid configuration is never
/// applied partially.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load tracing configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<TraceConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse tracing configuration from TOML text.
pub fn parse_config(content: &str) -> Result<TraceConfig, ConfigError> {
    let config: TraceConfig = toml::from_str(content)?;
    Ok(config)
}
