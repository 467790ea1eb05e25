use chrono::{DateTime, Utc};
use serde::Serialize;
use svckit::DomainEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { id: String, at: DateTime<Utc> },
    Updated { id: String, at: DateTime<Utc> },
    Deleted { id: String, at: DateTime<Utc> },
}

impl DomainEvent for ProductEvent {
    fn subject(&self) -> String {
        match self {
            Self::Created { .. } => "products.created",
            Self::Updated { .. } => "products.updated",
            Self::Deleted { .. } => "products.deleted",
        }
        .to_string()
    }
}
