#![allow(dead_code)]

use std::sync::Arc;

use datasource::Data;
use runtime::{DataConfig, RelationalConfig};
use users::domain::service::{Service, ServiceConfig};
use users::infra::storage::migrations;
use users::infra::storage::sea_orm_repo::SeaOrmUsersRepository;
use users::NewUser;

/// In-memory SQLite behind a real `Data`, with the users schema applied.
pub struct TestDb {
    pub data: Data,
    _home: tempfile::TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let home = tempfile::tempdir().expect("tempdir");
        let cfg = DataConfig {
            relational: Some(RelationalConfig {
                driver: "sqlite".into(),
                source: "sqlite::memory:".into(),
                max_conns: Some(1),
                auto_migrate: false,
            }),
            ..DataConfig::default()
        };
        let data = Data::connect(&cfg, home.path()).await.expect("connect");
        migrations::apply(data.relational().expect("relational").sea())
            .await
            .expect("migrate");
        Self { data, _home: home }
    }

    pub fn repo(&self) -> SeaOrmUsersRepository<sea_orm::DatabaseConnection> {
        SeaOrmUsersRepository::from_data(&self.data).expect("repo")
    }

    pub fn service(&self) -> Arc<Service> {
        Arc::new(Service::new(
            Arc::new(self.repo()),
            Arc::new(svckit::NoopPublisher),
            ServiceConfig::default(),
        ))
    }
}

pub fn user(username: &str, email: &str, phone: &str) -> NewUser {
    NewUser {
        username: username.into(),
        email: email.into(),
        phone: phone.into(),
        picture: None,
    }
}
