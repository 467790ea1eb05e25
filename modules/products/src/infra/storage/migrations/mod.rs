use sea_orm_migration::prelude::*;

mod m20250301_000002_create_products;

pub fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![Box::new(m20250301_000002_create_products::Migration)]
}

/// Apply the schema directly, without the migration bookkeeping table.
pub async fn apply(conn: &sea_orm_migration::sea_orm::DatabaseConnection) -> Result<(), DbErr> {
    let manager = SchemaManager::new(conn);
    for migration in migrations() {
        migration.up(&manager).await?;
    }
    Ok(())
}
