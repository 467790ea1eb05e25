use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    /// Unit price in the smallest currency unit.
    pub price_cents: i64,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
}

impl NewProduct {
    /// Span attribute: name, sku, price and stock.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name, self.sku, self.price_cents, self.stock
        )
    }
}

impl Product {
    pub fn fields(&self) -> NewProduct {
        NewProduct {
            name: self.name.clone(),
            sku: self.sku.clone(),
            description: self.description.clone(),
            price_cents: self.price_cents,
            stock: self.stock,
        }
    }
}
