use std::sync::Arc;

use chrono::Utc;
use svckit::{EventPublisher, Pagination};
use tracing::{info, instrument};

use crate::contract::model::{NewProduct, Product};
use crate::domain::error::DomainError;
use crate::domain::events::ProductEvent;
use crate::domain::repo::ProductsRepository;

#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn ProductsRepository>,
    events: Arc<dyn EventPublisher<ProductEvent>>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 1000,
        }
    }
}

impl Service {
    pub fn new(
        repo: Arc<dyn ProductsRepository>,
        events: Arc<dyn EventPublisher<ProductEvent>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            events,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    #[instrument(
        name = "products.service.create_product",
        skip(self, product),
        fields(sku = %product.sku)
    )]
    pub async fn create_product(&self, product: NewProduct) -> Result<String, DomainError> {
        validate(&product)?;
        let id = self.repo.save(product).await?;
        self.events.publish(&ProductEvent::Created {
            id: id.clone(),
            at: Utc::now(),
        });
        info!(%id, "product created");
        Ok(id)
    }

    #[instrument(name = "products.service.get_product", skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &str) -> Result<Product, DomainError> {
        Ok(self.repo.get_by_id(id).await?)
    }

    #[instrument(name = "products.service.list_products", skip(self), fields(pagination = %page))]
    pub async fn list_products(&self, page: Pagination) -> Result<Vec<Product>, DomainError> {
        Ok(self.repo.list(page).await?)
    }

    #[instrument(
        name = "products.service.update_product",
        skip(self, product),
        fields(product_id = %id)
    )]
    pub async fn update_product(
        &self,
        id: &str,
        product: NewProduct,
    ) -> Result<Product, DomainError> {
        validate(&product)?;
        let updated = self.repo.update(id, product).await?;
        self.events.publish(&ProductEvent::Updated {
            id: updated.id.to_string(),
            at: updated.updated_at,
        });
        info!("product updated");
        Ok(updated)
    }

    #[instrument(name = "products.service.delete_product", skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &str) -> Result<Product, DomainError> {
        let deleted = self.repo.delete(id).await?;
        self.events.publish(&ProductEvent::Deleted {
            id: deleted.id.to_string(),
            at: Utc::now(),
        });
        info!("product deleted");
        Ok(deleted)
    }

    #[instrument(
        name = "products.service.search_products",
        skip(self),
        fields(keyword = %keyword, pagination = %page)
    )]
    pub async fn search_products(
        &self,
        keyword: &str,
        page: Pagination,
    ) -> Result<Vec<Product>, DomainError> {
        Ok(self.repo.search(keyword, page).await?)
    }
}

fn validate(p: &NewProduct) -> Result<(), DomainError> {
    if p.name.trim().is_empty() {
        return Err(DomainError::validation("name", "must not be blank"));
    }
    if p.sku.trim().is_empty() {
        return Err(DomainError::validation("sku", "must not be blank"));
    }
    if p.price_cents < 0 {
        return Err(DomainError::validation("price_cents", "must not be negative"));
    }
    if p.stock < 0 {
        return Err(DomainError::validation("stock", "must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> NewProduct {
        NewProduct {
            name: "Desk lamp".into(),
            sku: "LMP-001".into(),
            description: None,
            price_cents: 1999,
            stock: 3,
        }
    }

    #[test]
    fn validation_rules() {
        assert!(validate(&product()).is_ok());

        let mut p = product();
        p.price_cents = -1;
        assert!(matches!(
            validate(&p),
            Err(DomainError::Validation { field: "price_cents", .. })
        ));

        let mut p = product();
        p.stock = -5;
        assert!(matches!(
            validate(&p),
            Err(DomainError::Validation { field: "stock", .. })
        ));

        let mut p = product();
        p.sku = " ".into();
        assert!(matches!(
            validate(&p),
            Err(DomainError::Validation { field: "sku", .. })
        ));
    }
}
