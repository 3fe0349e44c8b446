//! Queue port - background queue backends.
//!
//! A backend only moves opaque strings. Encoding, handler lookup and error
//! reporting all stay in the dispatcher, so any storage (memory, file,
//! broker) can be plugged in by implementing these four operations.

use std::sync::Arc;

use async_trait::async_trait;

/// QueueError is returned by backend operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The queue has been stopped. Workers exit cleanly on this.
    #[error("queue is done")]
    Done,

    /// The backend is saturated.
    #[error("queue is full (capacity={capacity})")]
    Full { capacity: usize },

    #[error("queue backend: {0}")]
    Backend(String),
}

impl QueueError {
    pub fn is_done(&self) -> bool {
        matches!(self, QueueError::Done)
    }
}

/// Queue is the contract every background queue backend implements.
///
/// # Lifecycle
/// - One master instance is registered by name.
/// - On start, each worker gets its own view from `instance(n)`.
/// - On stop, the dispatcher calls `stop()` on every view.
#[async_trait]
pub trait Queue: Send + Sync {
    /// Return an instance for one worker.
    ///
    /// `workers` is the number of workers per queue; backends may use it as
    /// a sizing hint. The result may share storage with `self` or not, the
    /// dispatcher does not care.
    fn instance(&self, workers: usize) -> Arc<dyn Queue>;

    /// Add one item. May wait or fail when saturated or stopped.
    async fn enqueue(&self, data: String) -> Result<(), QueueError>;

    /// Take one item, waiting until one is available.
    ///
    /// Returns `QueueError::Done` once `stop` has been called.
    async fn dequeue(&self) -> Result<String, QueueError>;

    /// Unblock in-flight `enqueue`/`dequeue` calls with `Done` and wait for
    /// them to return. Calling it twice must be harmless.
    async fn stop(&self);
}
