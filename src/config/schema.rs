//! Tracing configuration schema.
//!
//! All types derive Serde traits so hosts can embed a `[trace]` table in
//! their own configuration files. Every field has a default, keeping a
//! minimal or absent table valid.

use crate::logger::{Formatter, JsonFormatter, Level, Logger, TextFormatter};
use serde::{Deserialize, Serialize};

/// Output format for emitted entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// `key=value` console output.
    Text,
}

/// Operator-facing tracing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Minimum severity level.
    pub level: Level,

    /// Output format.
    pub format: LogFormat,

    /// Color the level token (text format only).
    pub colors: bool,

    /// Include the emission timestamp (text format only).
    pub timestamps: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            level: Level::Trace,
            format: LogFormat::Json,
            colors: false,
            timestamps: true,
        }
    }
}

impl TraceConfig {
    /// Build the formatter this configuration describes.
    pub fn formatter(&self) -> Box<dyn Formatter> {
        match self.format {
            LogFormat::Json => Box::new(JsonFormatter),
            LogFormat::Text => Box::new(TextFormatter {
                disable_colors: !self.colors,
                disable_timestamp: !self.timestamps,
                disable_sorting: false,
            }),
        }
    }

    /// Push this configuration onto a logger.
    ///
    /// Uses the logger's own lock discipline; entries already emitted are
    /// unaffected, all later ones observe the new settings.
    pub fn apply(&self, logger: &Logger) {
        logger.set_level(self.level);
        logger.set_formatter(self.formatter());
    }
}
