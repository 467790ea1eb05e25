use async_trait::async_trait;
use datasource::RepoError;
use svckit::Pagination;

use crate::contract::model::{NewUser, User};

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// Identifiers arrive as client-supplied strings; implementations parse them
/// before touching the store and report a parse failure as [`RepoError::InvalidId`].
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Insert a new record; the repository assigns the identifier.
    async fn save(&self, user: NewUser) -> Result<String, RepoError>;

    async fn get_by_id(&self, id: &str) -> Result<User, RepoError>;

    /// A window in insertion order. An empty window is not an error.
    async fn list(&self, page: Pagination) -> Result<Vec<User>, RepoError>;

    /// Full-record upsert under `id`.
    async fn update(&self, id: &str, user: NewUser) -> Result<User, RepoError>;

    /// Hard delete; returns the record as it was before deletion.
    async fn delete(&self, id: &str) -> Result<User, RepoError>;

    /// Substring match on username. No match is [`RepoError::ZeroRows`].
    async fn search(&self, keyword: &str, page: Pagination) -> Result<Vec<User>, RepoError>;
}
