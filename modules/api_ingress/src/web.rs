use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use datasource::Data;
use prometheus::Registry;

use crate::metrics;

/// Store health report; 503 when a configured store is down.
pub async fn health_check(Extension(data): Extension<Arc<Data>>) -> impl IntoResponse {
    let report = data.health().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

pub async fn serve_metrics(Extension(registry): Extension<Registry>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(&registry),
    )
}

pub async fn serve_openapi(
    Extension(doc): Extension<Arc<utoipa::openapi::OpenApi>>,
) -> Json<utoipa::openapi::OpenApi> {
    Json((*doc).clone())
}
