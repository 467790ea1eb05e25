use async_trait::async_trait;
use chrono::Utc;
use datasource::repo::{ensure_affected, ensure_rows, parse_id, substring_match};
use datasource::{Data, DataError, RepoError};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use svckit::Pagination;
use tracing::instrument;
use uuid::Uuid;

use crate::contract::model::{NewProduct, Product};
use crate::domain::repo::ProductsRepository;
use crate::infra::storage::entity::{active_model, Column, Entity as ProductEntity};

const RESOURCE: &str = "product";

pub struct SeaOrmProductsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmProductsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

impl SeaOrmProductsRepository<DatabaseConnection> {
    pub fn from_data(data: &Data) -> Result<Self, DataError> {
        let db = data
            .relational()
            .ok_or(DataError::Unconfigured("relational"))?;
        Ok(Self::new(db.sea_conn()))
    }
}

#[async_trait]
impl<C> ProductsRepository for SeaOrmProductsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    #[instrument(name = "products.save", skip_all, fields(product = %product.summary()), err)]
    async fn save(&self, product: NewProduct) -> Result<String, RepoError> {
        let id = Uuid::new_v4();
        let rows = ProductEntity::insert(active_model(id, product, Utc::now()))
            .exec_without_returning(&self.conn)
            .await?;
        ensure_affected("products.save", rows)?;
        Ok(id.to_string())
    }

    #[instrument(name = "products.get_by_id", skip(self), err)]
    async fn get_by_id(&self, id: &str) -> Result<Product, RepoError> {
        let id = parse_id(id)?;
        ProductEntity::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(Product::from)
            .ok_or(RepoError::NotFound {
                resource: RESOURCE,
                id,
            })
    }

    #[instrument(name = "products.list", skip(self), fields(pagination = %page), err)]
    async fn list(&self, page: Pagination) -> Result<Vec<Product>, RepoError> {
        let rows = ProductEntity::find()
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    #[instrument(
        name = "products.update",
        skip(self, product),
        fields(product = %product.summary()),
        err
    )]
    async fn update(&self, id: &str, product: NewProduct) -> Result<Product, RepoError> {
        let id = parse_id(id)?;
        let upsert = OnConflict::column(Column::Id)
            .update_columns([
                Column::Name,
                Column::Sku,
                Column::Description,
                Column::PriceCents,
                Column::Stock,
                Column::UpdatedAt,
            ])
            .to_owned();
        let rows = ProductEntity::insert(active_model(id, product, Utc::now()))
            .on_conflict(upsert)
            .exec_without_returning(&self.conn)
            .await?;
        ensure_affected("products.update", rows)?;

        ProductEntity::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(Product::from)
            .ok_or(RepoError::ZeroRows {
                op: "products.update",
            })
    }

    #[instrument(name = "products.delete", skip(self), err)]
    async fn delete(&self, id: &str) -> Result<Product, RepoError> {
        let id = parse_id(id)?;
        let snapshot = ProductEntity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(RepoError::NotFound {
                resource: RESOURCE,
                id,
            })?;
        let res = ProductEntity::delete_by_id(id).exec(&self.conn).await?;
        ensure_affected("products.delete", res.rows_affected)?;
        Ok(snapshot.into())
    }

    #[instrument(name = "products.search", skip(self), fields(pagination = %page), err)]
    async fn search(&self, keyword: &str, page: Pagination) -> Result<Vec<Product>, RepoError> {
        let rows = ProductEntity::find()
            .filter(substring_match(Column::Name, keyword))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.conn)
            .await?;
        let rows = ensure_rows("products.search", rows)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use tracing_test::traced_test;

    fn lamp() -> NewProduct {
        NewProduct {
            name: "Desk lamp".into(),
            sku: "LMP-001".into(),
            description: Some("Warm white".into()),
            price_cents: 1999,
            stock: 3,
        }
    }

    #[tokio::test]
    async fn malformed_ids_never_reach_the_store() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = SeaOrmProductsRepository::new(db.clone());

        assert!(matches!(
            repo.get_by_id("abc").await,
            Err(RepoError::InvalidId(_))
        ));
        assert!(matches!(
            repo.update("abc", lamp()).await,
            Err(RepoError::InvalidId(_))
        ));
        assert!(matches!(
            repo.delete("abc").await,
            Err(RepoError::InvalidId(_))
        ));

        drop(repo);
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn zero_affected_rows_on_save() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let repo = SeaOrmProductsRepository::new(db.clone());

        let err = repo.save(lamp()).await.unwrap_err();
        assert!(matches!(err, RepoError::ZeroRows { op: "products.save" }));
        assert!(logs_contain("products.save"));
        assert!(logs_contain("LMP-001"));

        drop(repo);
        assert_eq!(db.into_transaction_log().len(), 1);
    }
}
