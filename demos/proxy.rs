//! Minimal reverse proxy with every inbound request traced.
//!
//! Run with `cargo run --example proxy`, then:
//! `curl http://127.0.0.1:3100/get`

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use request_trace::{request_id_tracer, tracer_fn, TextFormatter, TraceLayer, Tracer};
use std::net::SocketAddr;
use std::str::FromStr;

const LISTEN_ADDR: &str = "127.0.0.1:3100";
const UPSTREAM: &str = "httpbin.org";

#[derive(Clone)]
struct AppState {
    client: Client<HttpConnector, Body>,
}

#[tokio::main]
async fn main() {
    request_trace::set_formatter(TextFormatter::default());

    let tracer = Tracer::new();
    tracer.add_tracer(tracer_fn(request_id_tracer));

    let state = AppState {
        client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
    };

    let app = Router::new()
        .route("/{*path}", any(forward))
        .route("/", any(forward))
        .with_state(state)
        .layer(TraceLayer::new(tracer));

    let listener = tokio::net::TcpListener::bind(LISTEN_ADDR)
        .await
        .expect("failed to bind listener");
    println!("proxy listening on {LISTEN_ADDR}, forwarding to {UPSTREAM}");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}

/// Forward the request to the upstream and relay its response.
async fn forward(State(state): State<AppState>, request: Request<Body>) -> impl IntoResponse {
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let uri = match Uri::from_str(&format!("http://{UPSTREAM}{target}")) {
        Ok(uri) => uri,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid request target").into_response(),
    };

    let (mut parts, body) = request.into_parts();
    parts.uri = uri;
    // The upstream sees its own host, not ours.
    parts.headers.remove("host");
    let request = Request::from_parts(parts, body);

    match state.client.request(request).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            format!("upstream request failed: {err}"),
        )
            .into_response(),
    }
}
