use futures::future::BoxFuture;
use std::future::Future;

/// Releases one handle's resources. Runs at most once.
pub type ShutdownHook = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send + Sync>;

/// Box an async closure as a [`ShutdownHook`].
pub fn shutdown_hook<F, Fut>(f: F) -> ShutdownHook
where
    F: FnOnce() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Box::new(move || Box::pin(f()))
}
