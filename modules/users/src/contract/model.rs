use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Pure user model for inter-module communication (no serde)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User fields without an identifier. Used for both create and full overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub picture: Option<String>,
}

impl NewUser {
    /// Space-joined unique fields, used as the `user` span attribute.
    pub fn summary(&self) -> String {
        format!("{} {} {}", self.username, self.email, self.phone)
    }
}

impl User {
    /// The identifier-free part of the record.
    pub fn fields(&self) -> NewUser {
        NewUser {
            username: self.username.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            picture: self.picture.clone(),
        }
    }
}
