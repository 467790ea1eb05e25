use async_trait::async_trait;
use datasource::RepoError;
use svckit::Pagination;

use crate::contract::model::{NewProduct, Product};

/// Persistence port for products. Same error policy as every resource
/// repository: malformed ids fail before the store, store errors pass through,
/// successful calls that touch nothing become [`RepoError::ZeroRows`].
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    async fn save(&self, product: NewProduct) -> Result<String, RepoError>;
    async fn get_by_id(&self, id: &str) -> Result<Product, RepoError>;
    async fn list(&self, page: Pagination) -> Result<Vec<Product>, RepoError>;
    async fn update(&self, id: &str, product: NewProduct) -> Result<Product, RepoError>;
    async fn delete(&self, id: &str) -> Result<Product, RepoError>;
    /// Substring match on the product name.
    async fn search(&self, keyword: &str, page: Pagination) -> Result<Vec<Product>, RepoError>;
}
