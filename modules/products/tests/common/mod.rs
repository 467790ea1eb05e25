#![allow(dead_code)]

use datasource::Data;
use products::infra::storage::migrations;
use products::{NewProduct, ProductsConfig, ProductsModule};
use runtime::{DataConfig, RelationalConfig};

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

    pub fn module(&self) -> ProductsModule {
        ProductsModule::new(&self.data, ProductsConfig::default()).expect("module")
    }
}

pub fn product(name: &str, sku: &str) -> NewProduct {
    NewProduct {
        name: name.into(),
        sku: sku.into(),
        description: None,
        price_cents: 1000,
        stock: 1,
    }
}
