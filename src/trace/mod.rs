//! Request tracing subsystem.
//!
//! # Data Flow
//! ```text
//! incoming request
//!     → Tracer::handle (middleware entry point)
//!     → tracer functions run in registration order,
//!       threading one log context through the chain
//!     → next handler (always invoked, exactly once)
//!     → staged response headers applied
//! ```
//!
//! # Design Decisions
//! - A tracer function returning `None` keeps the previous context; `Some`
//!   replaces it for the rest of the chain
//! - Each invocation is isolated: a panicking tracer is reported at error
//!   level and never prevents the downstream handler from running
//! - The registered sequence is swapped atomically; requests in flight
//!   finish on the snapshot they started with

pub mod default;
pub mod layer;
pub mod request_id;
pub mod sink;

pub use default::{default_tracer, RequestSnapshot, CONTENT_LENGTH_UNKNOWN};
pub use layer::{TraceLayer, TraceService};
pub use request_id::{request_id_tracer, X_REQUEST_ID};
pub use sink::ResponseSink;

use crate::logger::{Entry, Logger};
use arc_swap::ArcSwap;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// A unit of request-tracing logic composed into a chain.
///
/// Receives the running log context, the response-side sink, and the
/// request. Returning `Some` replaces the running context for the
/// remainder of the chain; returning `None` keeps it unchanged.
pub type TracerFn =
    Arc<dyn Fn(&Entry, &mut ResponseSink, &Request<Body>) -> Option<Entry> + Send + Sync>;

/// Wrap a closure as a [`TracerFn`].
pub fn tracer_fn<F>(f: F) -> TracerFn
where
    F: Fn(&Entry, &mut ResponseSink, &Request<Body>) -> Option<Entry> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Composable tracing middleware for incoming traffic.
///
/// Holds an ordered sequence of tracer functions and the logger their
/// contexts write through. One instance is shared by all concurrent
/// requests; per-request state lives entirely on the stack of
/// [`Tracer::handle`].
pub struct Tracer {
    logger: Logger,
    tracers: ArcSwap<Vec<TracerFn>>,
}

impl Tracer {
    /// Tracer on the process-wide default logger, preloaded with
    /// [`default_tracer`].
    pub fn new() -> Self {
        Self::with_logger(Logger::global().clone())
    }

    /// Tracer on an explicitly provided logger, preloaded with
    /// [`default_tracer`].
    pub fn with_logger(logger: Logger) -> Self {
        Self {
            logger,
            tracers: ArcSwap::from_pointee(vec![tracer_fn(default_tracer)]),
        }
    }

    /// The logger tracer chains write through.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Append one tracer function to the end of the sequence.
    pub fn add_tracer(&self, tracer: TracerFn) {
        self.tracers.rcu(|current| {
            let mut tracers = (**current).clone();
            tracers.push(tracer.clone());
            tracers
        });
    }

    /// Append several tracer functions, preserving their order.
    pub fn add_tracers(&self, tracers: impl IntoIterator<Item = TracerFn>) {
        let appended: Vec<TracerFn> = tracers.into_iter().collect();
        self.tracers.rcu(|current| {
            let mut tracers = (**current).clone();
            tracers.extend(appended.iter().cloned());
            tracers
        });
    }

    /// Replace the entire sequence atomically.
    pub fn set_tracers(&self, tracers: Vec<TracerFn>) {
        self.tracers.store(Arc::new(tracers));
    }

    /// Number of registered tracer functions.
    pub fn tracer_count(&self) -> usize {
        self.tracers.load().len()
    }

    /// Run the tracer chain for one request.
    ///
    /// Starts from a bare context on this tracer's logger and threads it
    /// through every registered function in order. A function that panics
    /// is reported at error level and skipped; the chain continues with
    /// the context it would have received.
    pub fn run(&self, sink: &mut ResponseSink, request: &Request<Body>) -> Entry {
        let tracers = self.tracers.load_full();
        let mut entry = Entry::new(self.logger.clone());
        for tracer in tracers.iter() {
            match catch_unwind(AssertUnwindSafe(|| tracer(&entry, &mut *sink, request))) {
                Ok(Some(next)) => entry = next,
                Ok(None) => {}
                Err(panic) => {
                    Entry::new(self.logger.clone())
                        .with_field("panic", panic_message(panic))
                        .error("tracer function panicked");
                }
            }
        }
        entry
    }

    /// Middleware entry point: trace the request, then continue the
    /// pipeline.
    ///
    /// The downstream handler runs exactly once, unconditionally. Tracing
    /// is observational and never short-circuits the request, whatever the
    /// tracer functions log or do.
    pub async fn handle(&self, request: Request<Body>, next: Next) -> Response {
        let mut sink = ResponseSink::new();
        self.run(&mut sink, &request);
        let mut response = next.run(request).await;
        sink.apply(response.headers_mut());
        response
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
