use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

/// `modules.products` in the app config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProductsConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ProductsConfig {
    fn default() -> Self {
        let svc = ServiceConfig::default();
        Self {
            default_page_size: svc.default_page_size,
            max_page_size: svc.max_page_size,
        }
    }
}

impl From<ProductsConfig> for ServiceConfig {
    fn from(cfg: ProductsConfig) -> Self {
        Self {
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
        }
    }
}
