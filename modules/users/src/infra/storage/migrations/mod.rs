use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;

/// Schema migrations of this module, oldest first. The binary composes these
/// with other modules' migrations into a single migrator.
pub fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![Box::new(m20250301_000001_create_users::Migration)]
}

/// Apply the schema directly, without the migration bookkeeping table.
pub async fn apply(conn: &sea_orm_migration::sea_orm::DatabaseConnection) -> Result<(), DbErr> {
    let manager = SchemaManager::new(conn);
    for migration in migrations() {
        migration.up(&manager).await?;
    }
    Ok(())
}
