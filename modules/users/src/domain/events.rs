use chrono::{DateTime, Utc};
use serde::Serialize;
use svckit::DomainEvent;

/// Transport-agnostic domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserEvent {
    Created { id: String, at: DateTime<Utc> },
    Updated { id: String, at: DateTime<Utc> },
    Deleted { id: String, at: DateTime<Utc> },
}

impl DomainEvent for UserEvent {
    fn subject(&self) -> String {
        let kind = match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::Deleted { .. } => "deleted",
        };
        format!("users.{kind}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subjects_and_payload() {
        let at = Utc::now();
        let ev = UserEvent::Deleted {
            id: "42".into(),
            at,
        };
        assert_eq!(ev.subject(), "users.deleted");

        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "deleted");
        assert_eq!(json["id"], "42");
    }
}
