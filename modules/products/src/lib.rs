//! Products resource: catalogue entries keyed by UUID with a unique SKU.

pub mod contract;
pub use contract::{NewProduct, Product};

pub mod config;
pub use config::ProductsConfig;

pub mod module;
pub use module::ProductsModule;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
