use serde::Serialize;

/// An event that knows which bus subject it belongs on.
pub trait DomainEvent: Serialize + Send + Sync + 'static {
    fn subject(&self) -> String;
}

/// Output port: publish domain events (no knowledge of transport).
///
/// Publishing is fire-and-forget; implementations log their own failures.
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}

/// Publisher used when no bus is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl<E> EventPublisher<E> for NoopPublisher {
    fn publish(&self, _event: &E) {}
}
