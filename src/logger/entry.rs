//! Chainable log contexts and the records they emit.

use crate::logger::{Level, Logger};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// A single emitted log record: what formatters and hooks observe.
#[derive(Debug, Clone)]
pub struct Record {
    /// Emission timestamp.
    pub time: DateTime<Utc>,
    /// Severity of the emission.
    pub level: Level,
    /// Rendered human-readable text.
    pub msg: String,
    /// Staged message attribute, when one was set on the entry.
    pub message: Option<String>,
    /// Structured fields in insertion order.
    pub fields: Vec<(String, Value)>,
}

/// A logger handle with structured fields already attached.
///
/// Entries are cheap to derive and never mutated in place by consumers:
/// `with_field`/`with_fields` return a new entry, so every step of a tracer
/// chain observes exactly the context its predecessor produced. An entry is
/// written out by one of the leveled emission methods, not at drop.
#[derive(Debug, Clone)]
pub struct Entry {
    logger: Logger,
    fields: Vec<(String, Value)>,
    message: Option<String>,
    time: Option<DateTime<Utc>>,
}

impl Entry {
    /// Create a bare entry bound to the given logger, with no fields.
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            fields: Vec::new(),
            message: None,
            time: None,
        }
    }

    /// The logger this entry writes through.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Structured fields attached so far, in insertion order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Derive a new entry with one additional field.
    ///
    /// Re-using an existing key replaces its value but keeps its position.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut entry = self.clone();
        entry.insert(key.into(), value.into());
        entry
    }

    /// Derive a new entry with several additional fields.
    pub fn with_fields<K, V>(&self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut entry = self.clone();
        for (key, value) in fields {
            entry.insert(key.into(), value.into());
        }
        entry
    }

    /// Stage the `message` attribute of the eventual record.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Staged message attribute, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Stage the timestamp of the eventual record.
    ///
    /// When unset, the record is stamped at emission time.
    pub fn set_time(&mut self, time: DateTime<Utc>) {
        self.time = Some(time);
    }

    /// Staged timestamp, if any.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    /// Emit at error severity.
    pub fn error(&self, msg: impl Into<String>) {
        self.log(Level::Error, msg.into());
    }

    /// Emit at warn severity.
    pub fn warn(&self, msg: impl Into<String>) {
        self.log(Level::Warn, msg.into());
    }

    /// Emit at info severity.
    pub fn info(&self, msg: impl Into<String>) {
        self.log(Level::Info, msg.into());
    }

    /// Emit at debug severity.
    pub fn debug(&self, msg: impl Into<String>) {
        self.log(Level::Debug, msg.into());
    }

    /// Emit at trace severity.
    pub fn trace(&self, msg: impl Into<String>) {
        self.log(Level::Trace, msg.into());
    }

    fn insert(&mut self, key: String, value: Value) {
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.fields.push((key, value));
        }
    }

    fn log(&self, level: Level, msg: String) {
        let record = Record {
            time: self.time.unwrap_or_else(Utc::now),
            level,
            msg,
            message: self.message.clone(),
            fields: self.fields.clone(),
        };
        self.logger.log(record);
    }
}
