//! OTLP trace export for spans produced through `tracing`.
//!
//! The exporter lives behind the `otel` feature. Without it, `init_tracing`
//! fails when export is requested. Either way a failure is not fatal: the
//! caller keeps running without export and logs the error once logging is up.

use crate::config::TracingConfig;
use crate::logging::BoxedLayer;

/// Keeps the tracer provider alive; `shutdown` flushes pending spans.
#[must_use = "dropping the guard early stops span export"]
pub struct TelemetryGuard {
    #[cfg(feature = "otel")]
    provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>,
}

impl TelemetryGuard {
    /// A guard with nothing to flush.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "otel")]
            provider: None,
        }
    }

    pub fn shutdown(self) {
        #[cfg(feature = "otel")]
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "trace exporter shutdown failed");
            }
        }
    }
}

/// Build the exporter layer. `Ok((None, _))` means export is not enabled.
#[cfg(feature = "otel")]
pub fn init_tracing(
    cfg: Option<&TracingConfig>,
) -> anyhow::Result<(Option<BoxedLayer>, TelemetryGuard)> {
    use anyhow::Context;
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::{
        trace::{Sampler, SdkTracerProvider},
        Resource,
    };
    use tracing_subscriber::Layer;

    let Some(cfg) = cfg.filter(|c| c.enabled) else {
        return Ok((None, TelemetryGuard::disabled()));
    };

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(cfg.otlp_endpoint.clone())
        .build()
        .with_context(|| format!("OTLP exporter for {} could not be built", cfg.otlp_endpoint))?;

    let ratio = cfg.sample_ratio.clamp(0.0, 1.0);
    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
            ratio,
        ))))
        .with_resource(
            Resource::builder()
                .with_service_name(cfg.service_name.clone())
                .build(),
        )
        .build();

    let tracer = provider.tracer("layout");
    let layer = tracing_opentelemetry::layer().with_tracer(tracer).boxed();

    Ok((
        Some(layer),
        TelemetryGuard {
            provider: Some(provider),
        },
    ))
}

#[cfg(not(feature = "otel"))]
pub fn init_tracing(
    cfg: Option<&TracingConfig>,
) -> anyhow::Result<(Option<BoxedLayer>, TelemetryGuard)> {
    if cfg.is_some_and(|c| c.enabled) {
        anyhow::bail!("tracing.enabled is set but the binary was built without the `otel` feature");
    }
    Ok((None, TelemetryGuard::disabled()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_yields_no_layer() {
        let cfg = TracingConfig::default();
        let (layer, guard) = init_tracing(Some(&cfg)).unwrap();
        assert!(layer.is_none());
        guard.shutdown();

        let (layer, guard) = init_tracing(None).unwrap();
        assert!(layer.is_none());
        guard.shutdown();
    }

    #[cfg(not(feature = "otel"))]
    #[test]
    fn enabled_export_without_the_feature_is_reported_to_the_caller() {
        let cfg = TracingConfig {
            enabled: true,
            ..TracingConfig::default()
        };
        let err = init_tracing(Some(&cfg)).err().unwrap();
        assert!(err.to_string().contains("`otel` feature"));
    }
}
