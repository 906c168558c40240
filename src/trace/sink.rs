//! Response-side staging for tracer functions.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Headers staged by tracer functions for the downstream response.
///
/// Tracers run before the rest of the pipeline produces a response, so
/// they cannot touch it directly. Anything inserted here is applied to
/// the response headers once the downstream handler has returned.
#[derive(Debug, Default)]
pub struct ResponseSink {
    headers: HeaderMap,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a header, replacing any previously staged value for the name.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Stage an additional value for a header name.
    pub fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    /// Headers staged so far.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Copy every staged header onto the response header map.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in self.headers.iter() {
            target.append(name.clone(), value.clone());
        }
    }
}
