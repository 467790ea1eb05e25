use std::sync::Arc;

use axum::Router;
use datasource::{BusPublisher, Data, DataError};
use sea_orm_migration::MigrationTrait;
use svckit::{EventPublisher, NoopPublisher};
use tracing::info;
use utoipa::OpenApi;

use crate::api::rest::routes::{self, ProductsApi};
use crate::config::ProductsConfig;
use crate::domain::events::ProductEvent;
use crate::domain::service::Service;
use crate::infra::storage::migrations;
use crate::infra::storage::sea_orm_repo::SeaOrmProductsRepository;

#[derive(Clone)]
pub struct ProductsModule {
    service: Arc<Service>,
}

impl ProductsModule {
    pub fn new(data: &Data, cfg: ProductsConfig) -> Result<Self, DataError> {
        let repo = SeaOrmProductsRepository::from_data(data)?;
        let events: Arc<dyn EventPublisher<ProductEvent>> = match data.bus() {
            Some(bus) => Arc::new(BusPublisher::new(bus)),
            None => Arc::new(NoopPublisher),
        };
        info!("products module ready");
        Ok(Self {
            service: Arc::new(Service::new(Arc::new(repo), events, cfg.into())),
        })
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn router(&self) -> Router {
        routes::router(self.service.clone())
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        ProductsApi::openapi()
    }

    pub fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        migrations::migrations()
    }
}
