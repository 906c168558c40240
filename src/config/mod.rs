//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! host config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → TraceConfig (validated by serde, defaults filled in)
//!     → TraceConfig::apply pushes level and formatter onto a Logger
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{LogFormat, TraceConfig};
