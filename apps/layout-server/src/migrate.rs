use anyhow::{Context, Result};
use datasource::Data;
use products::ProductsModule;
use sea_orm_migration::{MigrationTrait, MigratorTrait};
use users::UsersModule;

/// Every module's schema, applied as one history table.
pub struct Migrator;

impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        let mut all = UsersModule::migrations();
        all.extend(ProductsModule::migrations());
        all
    }
}

/// Apply pending migrations on the relational store.
pub async fn apply(data: &Data) -> Result<()> {
    let db = data
        .relational()
        .context("relational store is not configured (data.relational)")?;

    tracing::info!(dsn = %db.redacted_dsn(), "Applying migrations");
    Migrator::up(db.sea(), None)
        .await
        .context("applying migrations")?;
    tracing::info!("Migrations applied");
    Ok(())
}
