//! Record formatters.
//!
//! A formatter renders one [`Record`] into one output line. The JSON
//! formatter is the default; the text formatter produces `key=value`
//! pairs for console reading. Data fields whose keys clash with the
//! reserved record attributes (`time`, `level`, `msg`, `message`) are
//! emitted under a `fields.` prefix so nothing is silently dropped.

use crate::logger::entry::Record;
use crate::logger::Level;
use serde_json::Value;
use std::fmt::Write as _;

/// Reserved record attribute keys.
const RESERVED_KEYS: [&str; 4] = ["time", "level", "msg", "message"];

/// Renders records into output lines.
pub trait Formatter: Send {
    /// Render the record as a single newline-terminated line.
    fn format(&self, record: &Record) -> Vec<u8>;
}

impl Formatter for Box<dyn Formatter> {
    fn format(&self, record: &Record) -> Vec<u8> {
        (**self).format(record)
    }
}

/// One JSON object per line.
#[derive(Debug, Default, Clone)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record) -> Vec<u8> {
        let mut map = serde_json::Map::new();
        for (key, value) in &record.fields {
            map.insert(escape_key(key), value.clone());
        }
        map.insert("time".to_string(), Value::from(record.time.to_rfc3339()));
        map.insert("level".to_string(), Value::from(record.level.as_str()));
        map.insert("msg".to_string(), Value::from(record.msg.clone()));
        if let Some(message) = &record.message {
            map.insert("message".to_string(), Value::from(message.clone()));
        }

        let mut line = Value::Object(map).to_string();
        line.push('\n');
        line.into_bytes()
    }
}

/// `key=value` console output.
///
/// Reserved attributes lead the line in a fixed order, data fields follow
/// sorted by key unless sorting is disabled, in which case insertion order
/// is kept.
#[derive(Debug, Default, Clone)]
pub struct TextFormatter {
    /// Suppress ANSI coloring of the level token.
    pub disable_colors: bool,
    /// Omit the leading emission timestamp.
    pub disable_timestamp: bool,
    /// Keep data fields in insertion order instead of sorting by key.
    pub disable_sorting: bool,
}

impl Formatter for TextFormatter {
    fn format(&self, record: &Record) -> Vec<u8> {
        let mut line = String::new();

        if !self.disable_timestamp {
            append_pair(
                &mut line,
                "time",
                &Value::from(record.time.to_rfc3339()),
            );
        }
        let level = if self.disable_colors {
            record.level.as_str().to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", level_color(record.level), record.level)
        };
        push_sep(&mut line);
        let _ = write!(line, "level={level}");
        append_pair(&mut line, "msg", &Value::from(record.msg.clone()));
        if let Some(message) = &record.message {
            append_pair(&mut line, "message", &Value::from(message.clone()));
        }

        let mut fields: Vec<(String, &Value)> = record
            .fields
            .iter()
            .map(|(k, v)| (escape_key(k), v))
            .collect();
        if !self.disable_sorting {
            fields.sort_by(|a, b| a.0.cmp(&b.0));
        }
        for (key, value) in fields {
            append_pair(&mut line, &key, value);
        }

        line.push('\n');
        line.into_bytes()
    }
}

fn level_color(level: Level) -> u8 {
    match level {
        Level::Error => 31,
        Level::Warn => 33,
        Level::Info => 36,
        Level::Debug | Level::Trace => 37,
    }
}

fn escape_key(key: &str) -> String {
    if RESERVED_KEYS.contains(&key) {
        format!("fields.{key}")
    } else {
        key.to_string()
    }
}

fn push_sep(line: &mut String) {
    if !line.is_empty() {
        line.push(' ');
    }
}

fn append_pair(line: &mut String, key: &str, value: &Value) {
    push_sep(line);
    match value {
        Value::String(s) if needs_quoting(s) => {
            let _ = write!(line, "{key}={s:?}");
        }
        Value::String(s) => {
            let _ = write!(line, "{key}={s}");
        }
        other => {
            let _ = write!(line, "{key}={other}");
        }
    }
}

/// A string renders bare only when it is plain `[A-Za-z0-9.-]` text.
fn needs_quoting(text: &str) -> bool {
    text.is_empty()
        || text
            .chars()
            .any(|ch| !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn record() -> Record {
        Record {
            time: Utc.with_ymd_and_hms(2024, 5, 2, 12, 30, 0).unwrap(),
            level: Level::Info,
            msg: "GET [127.0.0.1:32131] - localhost/foo".to_string(),
            message: Some("trace".to_string()),
            fields: vec![
                ("host".to_string(), Value::from("localhost")),
                ("path".to_string(), Value::from("/foo")),
                ("contentlength".to_string(), Value::from(10)),
            ],
        }
    }

    fn text_plain() -> TextFormatter {
        TextFormatter {
            disable_colors: true,
            disable_timestamp: true,
            disable_sorting: true,
        }
    }

    #[test]
    fn test_text_quoting_rule() {
        assert!(!needs_quoting("localhost"));
        assert!(!needs_quoting("127.0.0.1"));
        assert!(!needs_quoting("abc-def.1"));
        assert!(needs_quoting("/foo"));
        assert!(needs_quoting("HTTP/1.1"));
        assert!(needs_quoting("127.0.0.1:32131"));
        assert!(needs_quoting("two words"));
        assert!(needs_quoting(""));
    }

    #[test]
    fn test_text_layout() {
        let line = String::from_utf8(text_plain().format(&record())).unwrap();
        assert_eq!(
            line,
            "level=info msg=\"GET [127.0.0.1:32131] - localhost/foo\" \
             message=trace host=localhost path=\"/foo\" contentlength=10\n"
        );
    }

    #[test]
    fn test_text_timestamp_leads_line() {
        let formatter = TextFormatter {
            disable_colors: true,
            ..TextFormatter::default()
        };
        let line = String::from_utf8(formatter.format(&record())).unwrap();
        assert!(line.starts_with("time=\"2024-05-02T12:30:00"));
        assert!(line.contains(" level=info "));
    }

    #[test]
    fn test_text_sorts_fields_unless_disabled() {
        let mut rec = record();
        rec.fields = vec![
            ("zeta".to_string(), Value::from(1)),
            ("alpha".to_string(), Value::from(2)),
        ];

        let sorted = String::from_utf8(
            TextFormatter {
                disable_colors: true,
                disable_timestamp: true,
                disable_sorting: false,
            }
            .format(&rec),
        )
        .unwrap();
        assert!(sorted.find("alpha=2").unwrap() < sorted.find("zeta=1").unwrap());

        let unsorted = String::from_utf8(text_plain().format(&rec)).unwrap();
        assert!(unsorted.find("zeta=1").unwrap() < unsorted.find("alpha=2").unwrap());
    }

    #[test]
    fn test_text_compound_values_render_as_json() {
        let mut rec = record();
        rec.fields = vec![(
            "headers".to_string(),
            serde_json::json!({ "foo": ["bar"] }),
        )];
        let line = String::from_utf8(text_plain().format(&rec)).unwrap();
        assert!(line.contains("headers={\"foo\":[\"bar\"]}"));
    }

    #[test]
    fn test_reserved_field_keys_are_prefixed() {
        let mut rec = record();
        rec.fields = vec![("time".to_string(), Value::from("captured"))];

        let line = String::from_utf8(text_plain().format(&rec)).unwrap();
        assert!(line.contains("fields.time=captured"));

        let json: Value =
            serde_json::from_slice(&JsonFormatter.format(&rec)).unwrap();
        assert_eq!(json["fields.time"], "captured");
        assert!(json["time"].as_str().unwrap().starts_with("2024-05-02"));
    }

    #[test]
    fn test_json_shape() {
        let json: Value =
            serde_json::from_slice(&JsonFormatter.format(&record())).unwrap();
        assert_eq!(json["level"], "info");
        assert_eq!(json["msg"], "GET [127.0.0.1:32131] - localhost/foo");
        assert_eq!(json["message"], "trace");
        assert_eq!(json["host"], "localhost");
        assert_eq!(json["contentlength"], 10);
    }

    #[test]
    fn test_colored_level_token() {
        let formatter = TextFormatter {
            disable_timestamp: true,
            disable_sorting: true,
            ..TextFormatter::default()
        };
        let line = String::from_utf8(formatter.format(&record())).unwrap();
        assert!(line.contains("level=\x1b[36minfo\x1b[0m"));
    }
}
