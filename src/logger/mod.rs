//! Structured logger shared by tracer chains.
//!
//! # Responsibilities
//! - Hold the mutable logger configuration (sink, formatter, level, hooks)
//! - Guard every configuration read and write with one coarse lock
//! - Drive the emission path: level gate, hooks, format, write
//!
//! # Design Decisions
//! - One `Mutex` over the whole configuration keeps changes atomic; config
//!   churn is rare next to request volume, so contention is acceptable
//! - A process-wide default instance mirrors the classic package-level API,
//!   but loggers are plain values and can be constructed and injected
//! - Sink and hook failures are reported to stderr and swallowed: emitting
//!   a trace must never fail the request being traced

pub mod entry;
pub mod format;
pub mod hook;
pub mod level;

pub use entry::{Entry, Record};
pub use format::{Formatter, JsonFormatter, TextFormatter};
pub use hook::{Hook, HookError};
pub use level::{Level, ParseLevelError};

use std::io::Write;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

static GLOBAL: LazyLock<Logger> = LazyLock::new(Logger::new);

/// A cloneable handle to one logger configuration.
///
/// Clones share the same configuration; mutating through any handle is
/// visible to all of them.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Mutex<LoggerInner>>,
}

struct LoggerInner {
    out: Box<dyn Write + Send>,
    formatter: Box<dyn Formatter>,
    level: Level,
    hooks: Vec<Box<dyn Hook>>,
}

impl Logger {
    /// Create a logger with the default configuration: stderr sink, JSON
    /// formatter, `Trace` minimum level (nothing filtered), no hooks.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(LoggerInner {
                out: Box::new(std::io::stderr()),
                formatter: Box::new(JsonFormatter),
                level: Level::Trace,
                hooks: Vec::new(),
            })),
        }
    }

    /// The process-wide default logger.
    pub fn global() -> &'static Logger {
        &GLOBAL
    }

    /// Replace the output sink.
    pub fn set_output(&self, out: impl Write + Send + 'static) {
        self.lock().out = Box::new(out);
    }

    /// Replace the formatter.
    pub fn set_formatter(&self, formatter: impl Formatter + 'static) {
        self.lock().formatter = Box::new(formatter);
    }

    /// Set the minimum severity level.
    pub fn set_level(&self, level: Level) {
        self.lock().level = level;
    }

    /// Current minimum severity level.
    pub fn level(&self) -> Level {
        self.lock().level
    }

    /// Register a hook invoked on every emitted record.
    pub fn add_hook(&self, hook: impl Hook + 'static) {
        self.lock().hooks.push(Box::new(hook));
    }

    /// Derive a bare entry bound to this logger.
    pub fn entry(&self) -> Entry {
        Entry::new(self.clone())
    }

    /// Emit one record: gate on level, fire hooks, format, write.
    ///
    /// The whole path runs under the configuration lock, which also
    /// serializes physical writes from concurrent requests.
    pub(crate) fn log(&self, record: Record) {
        let mut inner = self.lock();
        if record.level > inner.level {
            return;
        }
        for hook in &inner.hooks {
            if hook.levels().contains(&record.level) {
                if let Err(err) = hook.fire(&record) {
                    eprintln!("request-trace: failed to fire hook: {err}");
                }
            }
        }
        let line = inner.formatter.format(&record);
        if let Err(err) = inner.out.write_all(&line) {
            eprintln!("request-trace: failed to write log entry: {err}");
        }
    }

    // A poisoned lock still holds a valid configuration; logging must not
    // panic inside a request, so recover instead of unwrapping.
    fn lock(&self) -> MutexGuard<'_, LoggerInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// Set the output sink of the process-wide default logger.
pub fn set_output(out: impl Write + Send + 'static) {
    Logger::global().set_output(out);
}

/// Set the formatter of the process-wide default logger.
pub fn set_formatter(formatter: impl Formatter + 'static) {
    Logger::global().set_formatter(formatter);
}

/// Set the minimum level of the process-wide default logger.
pub fn set_level(level: Level) {
    Logger::global().set_level(level);
}

/// Minimum level of the process-wide default logger.
pub fn get_level() -> Level {
    Logger::global().level()
}

/// Register a hook on the process-wide default logger.
pub fn add_hook(hook: impl Hook + 'static) {
    Logger::global().add_hook(hook);
}
