//! Correlation ids: taken from `x-request-id` when the caller sends one,
//! generated otherwise, and echoed on the response.

use axum::http::{HeaderName, HeaderValue, Request};
use axum::{body::Body, middleware::Next, response::Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::{DefaultOnFailure, TraceLayer};
use tracing::{field::Empty, Level, Span};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// The current call's id, readable by handlers as an extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationId(pub String);

/// Generates nanoid ids for requests that arrive without one.
#[derive(Clone, Copy, Default)]
pub struct NanoRequestId;

impl MakeRequestId for NanoRequestId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&nanoid::nanoid!())
            .ok()
            .map(RequestId::new)
    }
}

pub fn set_layer() -> SetRequestIdLayer<NanoRequestId> {
    SetRequestIdLayer::new(REQUEST_ID_HEADER, NanoRequestId)
}

pub fn propagate_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(REQUEST_ID_HEADER)
}

fn correlation_id_of<B>(req: &Request<B>) -> &str {
    req.extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("n/a")
}

/// Exposes the id to handlers and records it on the request span.
pub async fn record_correlation_id(mut req: Request<Body>, next: Next) -> Response {
    let id = correlation_id_of(&req).to_owned();
    Span::current().record("request_id", id.as_str());
    req.extensions_mut().insert(CorrelationId(id));
    next.run(req).await
}

pub type HttpTraceLayer =
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, fn(&Request<Body>) -> Span>;

fn http_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "http.request",
        method = %req.method(),
        uri = %req.uri().path(),
        version = ?req.version(),
        request_id = %correlation_id_of(req),
        status = Empty,
        latency_ms = Empty
    )
}

/// One `http.request` span per call; `status` and `latency_ms` are recorded
/// by the request log middleware. Failed responses are reported at WARN.
pub fn trace_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(http_span as fn(&Request<Body>) -> Span)
        .on_failure(DefaultOnFailure::new().level(Level::WARN))
}
