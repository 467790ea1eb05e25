//! Connections to the backing stores and the aggregate that owns them.
//!
//! Every factory turns one config section into a live handle plus a
//! [`ShutdownHook`]. Missing required settings and failed liveness checks are
//! hard errors. [`Data`] holds whatever was configured and tears it down once.
//!
//! ```rust,no_run
//! # async fn demo(cfg: runtime::DataConfig) -> Result<(), datasource::DataError> {
//! let data = datasource::Data::connect(&cfg, std::path::Path::new("/var/lib/layout")).await?;
//! if let Some(db) = data.relational() {
//!     db.sea().ping().await?;
//! }
//! data.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod bus;
pub mod cache;
mod data;
pub mod document;
mod env;
mod error;
mod hook;
pub mod relational;
pub mod repo;

pub use bus::{Bus, BusPublisher};
pub use data::{Data, DataBuilder, HealthReport, StoreHealth};
pub use env::{expand_env_vars, redact_credentials_in_dsn};
pub use error::DataError;
pub use hook::{shutdown_hook, ShutdownHook};
pub use relational::{DbEngine, DbHandle};
pub use repo::RepoError;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DataError>;
