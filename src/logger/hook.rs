//! Emission hooks.
//!
//! Hooks observe every record that passes the level gate, before it is
//! formatted and written. Typical use is shipping entries to an external
//! collector. Hook failures are reported to stderr and never propagate:
//! logging stays fire-and-forget for the request path.

use crate::logger::entry::Record;
use crate::logger::Level;
use thiserror::Error;

/// Error reported by a failing hook.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HookError(String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<std::io::Error> for HookError {
    fn from(err: std::io::Error) -> Self {
        Self(err.to_string())
    }
}

/// A capability invoked on every emitted record at its subscribed levels.
pub trait Hook: Send {
    /// Levels this hook subscribes to.
    fn levels(&self) -> &[Level];

    /// Observe one emitted record.
    fn fire(&self, record: &Record) -> Result<(), HookError>;
}
