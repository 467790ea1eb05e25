//! HTTP ingress: wraps the resource routers in the shared middleware chain and
//! serves them until cancelled.
//!
//! Layers, outermost first:
//!
//! 1. request id: set when missing, echoed on the response
//! 2. body limit, CORS, timeout
//! 3. panic recovery
//! 4. `http.request` trace span
//! 5. request id recorded into the span and request extensions
//! 6. structured request log
//! 7. request metrics (route level)
//!
//! Payload validation happens last, in the `ValidatedJson` extractor.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::{Extension, Router};
use datasource::Data;
use prometheus::Registry;
use runtime::ServerConfig;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

pub mod config;
pub mod metrics;
pub mod middleware;
pub mod request_id;
mod web;

use metrics::HttpMetrics;

pub struct ApiIngress {
    config: ServerConfig,
    registry: Registry,
    metrics: Arc<HttpMetrics>,
    openapi: Arc<utoipa::openapi::OpenApi>,
}

impl ApiIngress {
    pub fn new(config: ServerConfig, openapi: utoipa::openapi::OpenApi) -> Result<Self> {
        let registry = Registry::new();
        let metrics = HttpMetrics::register(&registry).context("registering HTTP metrics")?;
        Ok(Self {
            config,
            registry,
            metrics: Arc::new(metrics),
            openapi: Arc::new(openapi),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Merge the resource `routes` with the operational endpoints and wrap
    /// everything in the middleware chain.
    pub fn build_router(&self, routes: Router, data: Arc<Data>) -> Result<Router> {
        let ops = Router::new()
            .route("/health", get(web::health_check))
            .route(&self.config.metrics_path, get(web::serve_metrics))
            .route("/openapi.json", get(web::serve_openapi))
            .layer(Extension(data))
            .layer(Extension(self.registry.clone()))
            .layer(Extension(self.openapi.clone()));

        let mut router = routes
            .merge(ops)
            .route_layer(from_fn_with_state(self.metrics.clone(), metrics::track_metrics))
            .layer(from_fn(middleware::log_request))
            .layer(from_fn(request_id::record_correlation_id))
            .layer(request_id::trace_layer())
            .layer(CatchPanicLayer::custom(middleware::panic_response));

        if self.config.timeout_sec > 0 {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(self.config.timeout_sec)));
        }
        if self.config.cors.enabled {
            router = router.layer(config::cors_layer(&self.config.cors)?);
        }
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        Ok(router
            .layer(request_id::propagate_layer())
            .layer(request_id::set_layer()))
    }

    /// Bind `host:port` from config and serve until `cancel` fires.
    pub async fn serve(&self, router: Router, cancel: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))
            .await
            .with_context(|| {
                format!(
                    "binding HTTP listener on {}:{}",
                    self.config.host, self.config.port
                )
            })?;
        serve_on(listener, router, cancel).await
    }
}

/// Serve on an already bound listener. In-flight requests are drained after
/// cancellation; new connections are refused.
pub async fn serve_on(listener: TcpListener, router: Router, cancel: CancellationToken) -> Result<()> {
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(%addr, "HTTP server listening");

    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully (cancellation)");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}
