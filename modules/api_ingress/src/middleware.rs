use std::any::Any;
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use svckit::api::problem::internal_error;
use tracing::{error, info, warn, Span};

/// One structured line per request, level chosen by status class.
///
/// 5xx stays at WARN: the failure itself is logged at ERROR where it was raised.
pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let resp = next.run(req).await;

    let status = resp.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    let span = Span::current();
    span.record("status", status);
    span.record("latency_ms", latency_ms);

    if resp.status().is_server_error() {
        warn!(%method, %path, status, latency_ms, "request failed");
    } else if resp.status().is_client_error() {
        warn!(%method, %path, status, latency_ms, "request rejected");
    } else {
        info!(%method, %path, status, latency_ms, "request served");
    }
    resp
}

/// Turns a handler panic into a generic 500 problem.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "handler panicked");

    internal_error("The server encountered an unexpected condition").into_response()
}
