//! SeaORM-backed repository implementation for the domain port.
//!
//! This struct is generic over `C: ConnectionTrait`, so you can construct it
//! with a `DatabaseConnection` **or** a transactional connection.
//!
//! Every method runs inside its own `users.<op>` span. Errors are recorded on
//! that span once and handed back unchanged; a store call that succeeds
//! without touching a row becomes [`RepoError::ZeroRows`].

use async_trait::async_trait;
use chrono::Utc;
use datasource::repo::{ensure_affected, ensure_rows, parse_id, substring_match};
use datasource::{Data, DataError, RepoError};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use svckit::Pagination;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::contract::model::{NewUser, User};
use crate::domain::repo::UsersRepository;
use crate::infra::storage::entity::{active_model, Column, Entity as UserEntity};

const RESOURCE: &str = "user";

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

impl SeaOrmUsersRepository<DatabaseConnection> {
    /// Refuses to exist without a relational store.
    pub fn from_data(data: &Data) -> Result<Self, DataError> {
        let db = data
            .relational()
            .ok_or(DataError::Unconfigured("relational"))?;
        Ok(Self::new(db.sea_conn()))
    }
}

#[async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    #[instrument(name = "users.save", skip_all, fields(user = %user.summary()), err)]
    async fn save(&self, user: NewUser) -> Result<String, RepoError> {
        let id = Uuid::new_v4();
        let rows = UserEntity::insert(active_model(id, user, Utc::now()))
            .exec_without_returning(&self.conn)
            .await?;
        ensure_affected("users.save", rows)?;
        Ok(id.to_string())
    }

    #[instrument(name = "users.get_by_id", skip(self), err)]
    async fn get_by_id(&self, id: &str) -> Result<User, RepoError> {
        let id = parse_id(id)?;
        UserEntity::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(User::from)
            .ok_or(RepoError::NotFound {
                resource: RESOURCE,
                id,
            })
    }

    #[instrument(name = "users.list", skip(self), fields(pagination = %page), err)]
    async fn list(&self, page: Pagination) -> Result<Vec<User>, RepoError> {
        let rows = UserEntity::find()
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.conn)
            .await?;
        debug!(count = rows.len(), "fetched window");
        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(
        name = "users.update",
        skip(self, user),
        fields(user = %user.summary()),
        err
    )]
    async fn update(&self, id: &str, user: NewUser) -> Result<User, RepoError> {
        let id = parse_id(id)?;
        let upsert = OnConflict::column(Column::Id)
            .update_columns([
                Column::Username,
                Column::Email,
                Column::Phone,
                Column::Picture,
                Column::UpdatedAt,
            ])
            .to_owned();
        let rows = UserEntity::insert(active_model(id, user, Utc::now()))
            .on_conflict(upsert)
            .exec_without_returning(&self.conn)
            .await?;
        ensure_affected("users.update", rows)?;

        // read back so created_at reflects the stored record
        let stored = UserEntity::find_by_id(id).one(&self.conn).await?;
        stored
            .map(User::from)
            .ok_or(RepoError::ZeroRows { op: "users.update" })
    }

    #[instrument(name = "users.delete", skip(self), err)]
    async fn delete(&self, id: &str) -> Result<User, RepoError> {
        let id = parse_id(id)?;
        let snapshot = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(RepoError::NotFound {
                resource: RESOURCE,
                id,
            })?;
        let res = UserEntity::delete_by_id(id).exec(&self.conn).await?;
        ensure_affected("users.delete", res.rows_affected)?;
        Ok(snapshot.into())
    }

    #[instrument(
        name = "users.search",
        skip(self),
        fields(pagination = %page),
        err
    )]
    async fn search(&self, keyword: &str, page: Pagination) -> Result<Vec<User>, RepoError> {
        let rows = UserEntity::find()
            .filter(substring_match(Column::Username, keyword))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.conn)
            .await?;
        let rows = ensure_rows("users.search", rows)?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}
