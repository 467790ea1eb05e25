//! Service toolkit shared by resource modules and the HTTP ingress.

pub mod api;
pub mod events;
pub mod pagination;
pub mod shutdown;

pub use api::problem::{Problem, ProblemResponse};
pub use api::validated::ValidatedJson;
pub use events::{DomainEvent, EventPublisher, NoopPublisher};
pub use pagination::{PageQuery, Pagination};
