use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use datasource::RepoError;
use svckit::{DomainEvent, EventPublisher, Pagination};
use tracing_test::traced_test;
use users::domain::error::DomainError;
use users::domain::events::UserEvent;
use users::domain::repo::UsersRepository;
use users::domain::service::{Service, ServiceConfig};
use users::{NewUser, User};
use uuid::Uuid;

/// Repository double that counts calls and answers from a fixed script.
#[derive(Default)]
struct ScriptedRepo {
    calls: Mutex<Vec<&'static str>>,
    fail_with_zero_rows: bool,
}

impl ScriptedRepo {
    fn record(&self, op: &'static str) {
        self.calls.lock().unwrap().push(op);
    }

    fn user(id: Uuid, u: NewUser) -> User {
        let now = Utc::now();
        User {
            id,
            username: u.username,
            email: u.email,
            phone: u.phone,
            picture: u.picture,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl UsersRepository for ScriptedRepo {
    async fn save(&self, _user: NewUser) -> Result<String, RepoError> {
        self.record("save");
        if self.fail_with_zero_rows {
            return Err(RepoError::ZeroRows { op: "users.save" });
        }
        Ok(Uuid::nil().to_string())
    }

    async fn get_by_id(&self, id: &str) -> Result<User, RepoError> {
        self.record("get_by_id");
        let id = datasource::repo::parse_id(id)?;
        Err(RepoError::NotFound {
            resource: "user",
            id,
        })
    }

    async fn list(&self, _page: Pagination) -> Result<Vec<User>, RepoError> {
        self.record("list");
        Ok(Vec::new())
    }

    async fn update(&self, id: &str, user: NewUser) -> Result<User, RepoError> {
        self.record("update");
        Ok(Self::user(datasource::repo::parse_id(id)?, user))
    }

    async fn delete(&self, id: &str) -> Result<User, RepoError> {
        self.record("delete");
        Ok(Self::user(
            datasource::repo::parse_id(id)?,
            NewUser {
                username: "gone".into(),
                email: "g@x.com".into(),
                phone: "000".into(),
                picture: None,
            },
        ))
    }

    async fn search(&self, _keyword: &str, _page: Pagination) -> Result<Vec<User>, RepoError> {
        self.record("search");
        Err(RepoError::ZeroRows { op: "users.search" })
    }
}

#[derive(Default)]
struct RecordingPublisher {
    subjects: Mutex<Vec<String>>,
}

impl EventPublisher<UserEvent> for RecordingPublisher {
    fn publish(&self, event: &UserEvent) {
        self.subjects.lock().unwrap().push(event.subject());
    }
}

fn new_user() -> NewUser {
    NewUser {
        username: "alice".into(),
        email: "a@x.com".into(),
        phone: "111".into(),
        picture: None,
    }
}

fn service(repo: Arc<ScriptedRepo>, events: Arc<RecordingPublisher>) -> Service {
    Service::new(repo, events, ServiceConfig::default())
}

#[tokio::test]
#[traced_test]
async fn create_publishes_and_is_traced() {
    let repo = Arc::new(ScriptedRepo::default());
    let events = Arc::new(RecordingPublisher::default());
    let svc = service(repo.clone(), events.clone());

    let id = svc.create_user(new_user()).await.unwrap();
    assert_eq!(id, Uuid::nil().to_string());

    assert_eq!(*repo.calls.lock().unwrap(), vec!["save"]);
    assert_eq!(*events.subjects.lock().unwrap(), vec!["users.created"]);
    assert!(logs_contain("users.service.create_user"));
    assert!(logs_contain("user created"));
}

#[tokio::test]
async fn blank_fields_are_rejected_before_the_repository() {
    let repo = Arc::new(ScriptedRepo::default());
    let events = Arc::new(RecordingPublisher::default());
    let svc = service(repo.clone(), events.clone());

    let mut blank = new_user();
    blank.phone = "   ".into();

    let err = svc.create_user(blank.clone()).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { field: "phone", .. }));
    let err = svc
        .update_user(&Uuid::new_v4().to_string(), blank)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { field: "phone", .. }));

    assert!(repo.calls.lock().unwrap().is_empty());
    assert!(events.subjects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_writes_publish_nothing() {
    let repo = Arc::new(ScriptedRepo {
        fail_with_zero_rows: true,
        ..ScriptedRepo::default()
    });
    let events = Arc::new(RecordingPublisher::default());
    let svc = service(repo, events.clone());

    let err = svc.create_user(new_user()).await.unwrap_err();
    assert!(matches!(err, DomainError::Repo(RepoError::ZeroRows { .. })));
    assert!(events.subjects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn update_and_delete_publish_their_events() {
    let events = Arc::new(RecordingPublisher::default());
    let svc = service(Arc::new(ScriptedRepo::default()), events.clone());
    let id = Uuid::new_v4().to_string();

    svc.update_user(&id, new_user()).await.unwrap();
    let deleted = svc.delete_user(&id).await.unwrap();
    assert_eq!(deleted.username, "gone");

    assert_eq!(
        *events.subjects.lock().unwrap(),
        vec!["users.updated", "users.deleted"]
    );
}

#[tokio::test]
async fn repository_errors_surface_unchanged() {
    let svc = service(
        Arc::new(ScriptedRepo::default()),
        Arc::new(RecordingPublisher::default()),
    );

    let err = svc.get_user("not-a-uuid").await.unwrap_err();
    assert!(matches!(err, DomainError::Repo(RepoError::InvalidId(_))));

    let err = svc
        .search_users("zzz", Pagination::new(0, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Repo(RepoError::ZeroRows { op: "users.search" })));
}
