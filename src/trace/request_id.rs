//! Request-id tracer.

use crate::logger::Entry;
use crate::trace::ResponseSink;
use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use uuid::Uuid;

/// Header carrying the request id on both request and response.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Tracer that stamps every request with an id.
///
/// Reuses an inbound `x-request-id` when the client supplied one,
/// otherwise generates a UUIDv4. The id is attached as a `request_id`
/// field on the running context (extending it, unlike the default tracer)
/// and echoed on the response so callers can correlate.
pub fn request_id_tracer(
    entry: &Entry,
    sink: &mut ResponseSink,
    request: &Request<Body>,
) -> Option<Entry> {
    let id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(value) = HeaderValue::from_str(&id) {
        sink.insert_header(HeaderName::from_static(X_REQUEST_ID), value);
    }

    Some(entry.with_field("request_id", id))
}
