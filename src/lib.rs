//! HTTP request tracing middleware for axum/tower proxy pipelines.
//!
//! Incoming requests are threaded through a chain of tracer functions
//! that extract structured metadata and emit it through a configurable
//! logger, then control passes to the next handler. Tracing is strictly
//! observational: it never blocks, alters, or short-circuits the request.

pub mod config;
pub mod logger;
pub mod trace;

pub use config::{load_config, parse_config, ConfigError, LogFormat, TraceConfig};
pub use logger::{
    add_hook, get_level, set_formatter, set_level, set_output, Entry, Formatter, Hook, HookError,
    JsonFormatter, Level, Logger, Record, TextFormatter,
};
pub use trace::{
    default_tracer, request_id_tracer, tracer_fn, RequestSnapshot, ResponseSink, TraceLayer,
    Tracer, TracerFn, CONTENT_LENGTH_UNKNOWN, X_REQUEST_ID,
};
