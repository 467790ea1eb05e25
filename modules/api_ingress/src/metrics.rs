//! Request metrics in Prometheus text format.
//!
//! - `server_requests_code_total{kind,operation,code}` counts finished requests
//! - `server_requests_seconds{kind,operation}` is their latency histogram
//!
//! `operation` is the matched route template prefixed by the method, so
//! `/v1/users/{id}` stays one series regardless of the id.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{MatchedPath, State};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

const KIND: &str = "server";

#[derive(Clone)]
pub struct HttpMetrics {
    requests: IntCounterVec,
    seconds: HistogramVec,
}

impl HttpMetrics {
    /// Create the collectors and register them on `registry`.
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let requests = IntCounterVec::new(
            Opts::new("server_requests_code_total", "Finished requests by status code"),
            &["kind", "operation", "code"],
        )?;
        let seconds = HistogramVec::new(
            HistogramOpts::new("server_requests_seconds", "Request latency in seconds").buckets(
                vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
            ),
            &["kind", "operation"],
        )?;
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(seconds.clone()))?;
        Ok(Self { requests, seconds })
    }

    pub fn observe(&self, operation: &str, status: StatusCode, elapsed: Duration) {
        self.requests
            .with_label_values(&[KIND, operation, status.as_str()])
            .inc();
        self.seconds
            .with_label_values(&[KIND, operation])
            .observe(elapsed.as_secs_f64());
    }
}

/// Route-level middleware; must run after routing so `MatchedPath` is set.
pub async fn track_metrics(
    State(metrics): State<Arc<HttpMetrics>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let operation = format!("{} {}", req.method(), path);

    let started = Instant::now();
    let resp = next.run(req).await;
    metrics.observe(&operation, resp.status(), started.elapsed());
    resp
}

/// Render every collector on `registry` in the text exposition format.
pub fn render(registry: &Registry) -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
