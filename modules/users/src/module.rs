use std::sync::Arc;

use axum::Router;
use datasource::{BusPublisher, Data, DataError};
use sea_orm_migration::MigrationTrait;
use svckit::{EventPublisher, NoopPublisher};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::api::rest::routes::{self, UsersApi};
use crate::config::UsersConfig;
use crate::domain::events::UserEvent;
use crate::domain::service::Service;
use crate::infra::storage::migrations;
use crate::infra::storage::sea_orm_repo::SeaOrmUsersRepository;

/// Users resource: repository, service and REST surface wired over [`Data`].
#[derive(Clone)]
pub struct UsersModule {
    service: Arc<Service>,
}

impl UsersModule {
    /// Fails when the relational store is not configured.
    pub fn new(data: &Data, cfg: UsersConfig) -> Result<Self, DataError> {
        info!("Initializing users module");
        debug!(
            default_page_size = cfg.default_page_size,
            max_page_size = cfg.max_page_size,
            "Loaded users config"
        );

        let repo = SeaOrmUsersRepository::from_data(data)?;
        let events: Arc<dyn EventPublisher<UserEvent>> = match data.bus() {
            Some(bus) => Arc::new(BusPublisher::new(bus)),
            None => Arc::new(NoopPublisher),
        };
        let service = Service::new(Arc::new(repo), events, cfg.into());

        Ok(Self {
            service: Arc::new(service),
        })
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn router(&self) -> Router {
        routes::router(self.service.clone())
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        UsersApi::openapi()
    }

    pub fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        migrations::migrations()
    }
}
