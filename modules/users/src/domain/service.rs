use std::sync::Arc;

use chrono::Utc;
use svckit::{EventPublisher, Pagination};
use tracing::{debug, info, instrument};

use crate::contract::model::{NewUser, User};
use crate::domain::error::DomainError;
use crate::domain::events::UserEvent;
use crate::domain::repo::UsersRepository;

/// Domain service for user management.
/// Depends only on the repository and event ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    events: Arc<dyn EventPublisher<UserEvent>>,
    config: ServiceConfig,
}

/// Configuration for the domain service
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
        repo: Arc<dyn UsersRepository>,
        events: Arc<dyn EventPublisher<UserEvent>>,
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
        name = "users.service.create_user",
        skip(self, new_user),
        fields(username = %new_user.username)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<String, DomainError> {
        validate(&new_user)?;
        let id = self.repo.save(new_user).await?;

        self.events.publish(&UserEvent::Created {
            id: id.clone(),
            at: Utc::now(),
        });
        info!(%id, "user created");
        Ok(id)
    }

    #[instrument(name = "users.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &str) -> Result<User, DomainError> {
        Ok(self.repo.get_by_id(id).await?)
    }

    #[instrument(name = "users.service.list_users", skip(self), fields(pagination = %page))]
    pub async fn list_users(&self, page: Pagination) -> Result<Vec<User>, DomainError> {
        let users = self.repo.list(page).await?;
        debug!(count = users.len(), "listed users");
        Ok(users)
    }

    #[instrument(
        name = "users.service.update_user",
        skip(self, user),
        fields(user_id = %id)
    )]
    pub async fn update_user(&self, id: &str, user: NewUser) -> Result<User, DomainError> {
        validate(&user)?;
        let updated = self.repo.update(id, user).await?;

        self.events.publish(&UserEvent::Updated {
            id: updated.id.to_string(),
            at: updated.updated_at,
        });
        info!("user updated");
        Ok(updated)
    }

    #[instrument(name = "users.service.delete_user", skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &str) -> Result<User, DomainError> {
        let deleted = self.repo.delete(id).await?;

        self.events.publish(&UserEvent::Deleted {
            id: deleted.id.to_string(),
            at: Utc::now(),
        });
        info!("user deleted");
        Ok(deleted)
    }

    #[instrument(
        name = "users.service.search_users",
        skip(self),
        fields(keyword = %keyword, pagination = %page)
    )]
    pub async fn search_users(
        &self,
        keyword: &str,
        page: Pagination,
    ) -> Result<Vec<User>, DomainError> {
        Ok(self.repo.search(keyword, page).await?)
    }
}

/// Unique columns are NOT NULL in storage; blank values are rejected up front.
fn validate(user: &NewUser) -> Result<(), DomainError> {
    for (field, value) in [
        ("username", &user.username),
        ("email", &user.email),
        ("phone", &user.phone),
    ] {
        if value.trim().is_empty() {
            return Err(DomainError::validation(field, "must not be blank"));
        }
    }
    Ok(())
}
