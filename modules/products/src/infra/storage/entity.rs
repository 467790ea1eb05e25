use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use uuid::Uuid;

use crate::contract::model::{NewProduct, Product};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub sku: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            sku: m.sku,
            description: m.description,
            price_cents: m.price_cents,
            stock: m.stock,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn active_model(id: Uuid, p: NewProduct, at: DateTime<Utc>) -> ActiveModel {
    ActiveModel {
        id: Set(id),
        name: Set(p.name),
        sku: Set(p.sku),
        description: Set(p.description),
        price_cents: Set(p.price_cents),
        stock: Set(p.stock),
        created_at: Set(at),
        updated_at: Set(at),
    }
}
