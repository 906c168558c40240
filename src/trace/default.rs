//! Built-in tracer: one structured entry per request.

use crate::logger::Entry;
use crate::trace::ResponseSink;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::header::CONTENT_LENGTH;
use axum::http::Request;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::net::SocketAddr;

/// Declared content length when the request carries none.
pub const CONTENT_LENGTH_UNKNOWN: i64 = -1;

/// Read-only view of the request attributes the default tracer records.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    /// Protocol version, e.g. `HTTP/1.1`.
    pub protocol: String,
    /// Request method.
    pub method: String,
    /// Authority or Host header, empty when neither is present.
    pub host: String,
    /// Request target as received, not normalized.
    pub path: String,
    /// Remote address including port, empty when unknown.
    pub ip: String,
    /// Full header collection; multi-valued headers keep every value.
    pub headers: Map<String, Value>,
    /// Declared content length, [`CONTENT_LENGTH_UNKNOWN`] when absent.
    pub contentlength: i64,
    /// Capture instant.
    pub time: DateTime<Utc>,
}

impl RequestSnapshot {
    /// Capture the fixed field set from an incoming request.
    ///
    /// The remote address is read from the `ConnectInfo` extension the
    /// server attaches when built with connect info.
    pub fn capture(request: &Request<Body>) -> Self {
        let uri = request.uri();
        let host = uri
            .authority()
            .map(|a| a.to_string())
            .or_else(|| {
                request
                    .headers()
                    .get("host")
                    .and_then(|h| h.to_str().ok())
                    .map(str::to_owned)
            })
            .unwrap_or_default();

        let ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.to_string())
            .unwrap_or_default();

        let mut headers = Map::new();
        for name in request.headers().keys() {
            let values: Vec<Value> = request
                .headers()
                .get_all(name)
                .iter()
                .map(|v| Value::from(String::from_utf8_lossy(v.as_bytes()).into_owned()))
                .collect();
            headers.insert(name.as_str().to_string(), Value::Array(values));
        }

        let contentlength = request
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(CONTENT_LENGTH_UNKNOWN);

        Self {
            protocol: format!("{:?}", request.version()),
            method: request.method().to_string(),
            host,
            path: uri.to_string(),
            ip,
            headers,
            contentlength,
            time: Utc::now(),
        }
    }

    /// The human-readable request summary.
    pub fn summary(&self) -> String {
        format!(
            "{} {} [{}] - {}{}",
            self.protocol, self.method, self.ip, self.host, self.path
        )
    }
}

/// The built-in tracer function.
///
/// Captures a [`RequestSnapshot`], emits one info entry carrying every
/// snapshot field with the staged message `trace`, and returns the
/// populated context so later tracers extend it instead of starting over.
/// The inbound context's fields are deliberately ignored: this tracer
/// always opens a fresh entry on the chain's base logger.
pub fn default_tracer(
    entry: &Entry,
    _sink: &mut ResponseSink,
    request: &Request<Body>,
) -> Option<Entry> {
    let snapshot = RequestSnapshot::capture(request);
    let summary = snapshot.summary();

    let mut entry = Entry::new(entry.logger().clone())
        .with_field("protocol", snapshot.protocol)
        .with_field("method", snapshot.method)
        .with_field("host", snapshot.host)
        .with_field("path", snapshot.path)
        .with_field("ip", snapshot.ip)
        .with_field("headers", Value::Object(snapshot.headers))
        .with_field("contentlength", snapshot.contentlength)
        .with_field("time", snapshot.time.to_rfc3339());
    entry.set_message("trace");
    entry.set_time(snapshot.time);
    entry.info(summary);

    Some(entry)
}
