use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use uuid::Uuid;

use crate::contract::model::{NewUser, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub phone: String,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            phone: m.phone,
            picture: m.picture,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Every column set, ready for insert or upsert.
pub fn active_model(id: Uuid, user: NewUser, at: DateTime<Utc>) -> ActiveModel {
    ActiveModel {
        id: Set(id),
        username: Set(user.username),
        email: Set(user.email),
        phone: Set(user.phone),
        picture: Set(user.picture),
        created_at: Set(at),
        updated_at: Set(at),
    }
}
