//! Tower integration.
//!
//! Wraps a shared [`Tracer`] as a `tower::Layer` so proxy pipelines mount
//! it with `.layer(...)` next to their other middleware. The inner service
//! is the chain's downstream handler: it is called exactly once per
//! request, after the tracer functions have run.

use crate::trace::{ResponseSink, Tracer};
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Layer applying a [`Tracer`] to every request passing through.
#[derive(Clone)]
pub struct TraceLayer {
    tracer: Arc<Tracer>,
}

impl TraceLayer {
    /// Layer owning the given tracer.
    pub fn new(tracer: Tracer) -> Self {
        Self {
            tracer: Arc::new(tracer),
        }
    }

    /// Layer over a tracer shared with other parts of the host.
    pub fn from_shared(tracer: Arc<Tracer>) -> Self {
        Self { tracer }
    }

    /// The wrapped tracer.
    pub fn tracer(&self) -> &Arc<Tracer> {
        &self.tracer
    }
}

impl Default for TraceLayer {
    fn default() -> Self {
        Self::new(Tracer::new())
    }
}

impl<S> Layer<S> for TraceLayer {
    type Service = TraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceService {
            inner,
            tracer: self.tracer.clone(),
        }
    }
}

/// Service produced by [`TraceLayer`].
#[derive(Clone)]
pub struct TraceService<S> {
    inner: S,
    tracer: Arc<Tracer>,
}

impl<S> Service<Request<Body>> for TraceService<S>
where
    S: Service<Request<Body>, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let mut sink = ResponseSink::new();
        self.tracer.run(&mut sink, &request);
        let future = self.inner.call(request);
        Box::pin(async move {
            let mut response = future.await?;
            sink.apply(response.headers_mut());
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Logger;
    use crate::trace::tracer_fn;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn quiet_tracer() -> Tracer {
        let logger = Logger::new();
        logger.set_output(std::io::sink());
        Tracer::with_logger(logger)
    }

    #[tokio::test]
    async fn test_inner_service_called_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let inner = tower::service_fn(move |_request: Request<Body>| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(Response::new(Body::empty()))
            }
        });

        let tracer = quiet_tracer();
        let service = TraceLayer::new(tracer).layer(inner);
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        service.oneshot(request).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_inner_service_called_even_when_every_tracer_panics() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let inner = tower::service_fn(move |_request: Request<Body>| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(Response::new(Body::empty()))
            }
        });

        let tracer = quiet_tracer();
        tracer.set_tracers(vec![tracer_fn(|_entry, _sink, _request| {
            panic!("broken tracer")
        })]);
        let service = TraceLayer::new(tracer).layer(inner);
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = service.oneshot(request).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn test_staged_headers_reach_the_response() {
        let inner = tower::service_fn(|_request: Request<Body>| async {
            Ok::<_, Infallible>(Response::new(Body::empty()))
        });

        let tracer = quiet_tracer();
        tracer.set_tracers(vec![tracer_fn(|_entry, sink, _request| {
            sink.insert_header(
                axum::http::HeaderName::from_static("x-traced"),
                axum::http::HeaderValue::from_static("yes"),
            );
            None
        })]);
        let service = TraceLayer::new(tracer).layer(inner);
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = service.oneshot(request).await.unwrap();

        assert_eq!(response.headers().get("x-traced").unwrap(), "yes");
    }
}
