//! Process-level plumbing shared by the server binary: layered configuration,
//! logging sinks and optional trace export.

pub mod config;
pub mod home_dir;
pub mod logging;
pub mod telemetry;

pub use config::{
    AppConfig, BusConfig, CacheConfig, CliArgs, CorsConfig, DataConfig, DocumentConfig,
    LoggingConfig, RelationalConfig, Section, ServerConfig, TracingConfig,
};
pub use telemetry::TelemetryGuard;
