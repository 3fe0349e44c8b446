//! Registry - queue と handler の登録
//!
//! - Built during initialization (`&mut self`).
//! - Frozen into an `Arc<Registry>` when the dispatcher is built, and only
//!   read from then on.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::domain::{EventName, QueueName};
use crate::ports::Queue;
use crate::typed::{EventHandler, Handler, TypedHandler};

/// RegistryError is returned when a handler cannot be bound.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("queue `{0}` isn't registered")]
    QueueNotRegistered(QueueName),

    #[error("handler `{0}` is already added")]
    HandlerAlreadyAdded(EventName),
}

/// Handler + the queue its events travel through.
#[derive(Clone)]
pub struct Binding {
    handler: Arc<dyn EventHandler>,
    queue_name: QueueName,
    queue: Arc<dyn Queue>,
}

impl Binding {
    pub fn handler(&self) -> &Arc<dyn EventHandler> {
        &self.handler
    }

    pub fn queue_name(&self) -> &QueueName {
        &self.queue_name
    }

    /// Master instance of the bound queue, resolved when the handler was added.
    pub fn queue(&self) -> &Arc<dyn Queue> {
        &self.queue
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("queue_name", &self.queue_name)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct Registry {
    queues: HashMap<QueueName, Arc<dyn Queue>>,
    bindings: HashMap<EventName, Binding>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            queues: HashMap::new(),
            bindings: HashMap::new(),
        }
    }

    /// Make a queue available under `name`.
    ///
    /// # Panics
    /// If `name` is already registered.
    pub fn register_queue(&mut self, name: impl Into<QueueName>, queue: Arc<dyn Queue>) {
        let name = name.into();
        if self.queues.contains_key(&name) {
            panic!("herald: register queue `{name}` is already registered");
        }
        tracing::debug!(queue = %name, "registered queue");
        self.queues.insert(name, queue);
    }

    /// Bind `handler` to the event `name`, delivered through `queue_name`.
    pub fn add_handler(
        &mut self,
        name: impl Into<EventName>,
        queue_name: impl Into<QueueName>,
        handler: Arc<dyn EventHandler>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let queue_name = queue_name.into();
        let Some(queue) = self.queues.get(&queue_name).cloned() else {
            return Err(RegistryError::QueueNotRegistered(queue_name));
        };
        if self.bindings.contains_key(&name) {
            return Err(RegistryError::HandlerAlreadyAdded(name));
        }
        tracing::debug!(event = %name, queue = %queue_name, "added handler");
        self.bindings.insert(
            name,
            Binding {
                handler,
                queue_name,
                queue,
            },
        );
        Ok(())
    }

    /// Same as `add_handler`, for a handler taking decoded arguments.
    pub fn add_typed_handler<A, H>(
        &mut self,
        name: impl Into<EventName>,
        queue_name: impl Into<QueueName>,
        handler: H,
    ) -> Result<(), RegistryError>
    where
        A: DeserializeOwned + Send + 'static,
        H: Handler<A> + 'static,
    {
        self.add_handler(name, queue_name, Arc::new(TypedHandler::new(handler)))
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn queue(&self, name: &str) -> Option<&Arc<dyn Queue>> {
        self.queues.get(name)
    }

    pub fn queues(&self) -> impl Iterator<Item = (&QueueName, &Arc<dyn Queue>)> {
        self.queues.iter()
    }

    pub fn contains_event(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn event_names(&self) -> Vec<EventName> {
        self.bindings.keys().cloned().collect()
    }

    pub fn queue_names(&self) -> Vec<QueueName> {
        self.queues.keys().cloned().collect()
    }

    /// Number of bound events.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("queues", &self.queues.keys().collect::<Vec<_>>())
            .field("bindings", &self.bindings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Args, HandlerError};
    use crate::impls::MemoryQueue;
    use crate::typed::handler_fn;

    fn noop() -> Arc<dyn EventHandler> {
        Arc::new(handler_fn(|_args: Args| async { Ok::<(), HandlerError>(()) }))
    }

    fn registry_with_mem() -> Registry {
        let mut reg = Registry::new();
        reg.register_queue("mem", Arc::new(MemoryQueue::new()));
        reg
    }

    #[test]
    fn add_handler_binds_to_queue() {
        let mut reg = registry_with_mem();
        reg.add_handler("log.error", "mem", noop()).unwrap();

        let binding = reg.binding("log.error").unwrap();
        assert_eq!(binding.queue_name().as_str(), "mem");
        assert!(reg.contains_event("log.error"));
        assert_eq!(reg.len(), 1);
    }

    #[tokio::test]
    async fn binding_carries_the_registered_queue() {
        let mem = Arc::new(MemoryQueue::new());
        let mut reg = Registry::new();
        reg.register_queue("mem", mem.clone());
        reg.add_handler("log.error", "mem", noop()).unwrap();

        let binding = reg.binding("log.error").unwrap();
        binding.queue().enqueue("x".into()).await.unwrap();
        assert_eq!(mem.len(), 1);
    }

    #[test]
    fn add_handler_requires_registered_queue() {
        let mut reg = Registry::new();
        let err = reg.add_handler("log.error", "missing", noop()).unwrap_err();
        assert!(matches!(err, RegistryError::QueueNotRegistered(q) if q.as_str() == "missing"));
        assert!(reg.is_empty());
    }

    #[test]
    fn add_handler_twice_keeps_original_binding() {
        let mut reg = registry_with_mem();
        reg.register_queue("other", Arc::new(MemoryQueue::new()));
        reg.add_handler("log.error", "mem", noop()).unwrap();

        let err = reg.add_handler("log.error", "other", noop()).unwrap_err();
        assert!(matches!(err, RegistryError::HandlerAlreadyAdded(_)));
        assert_eq!(reg.binding("log.error").unwrap().queue_name().as_str(), "mem");
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn register_queue_twice_panics() {
        let mut reg = registry_with_mem();
        reg.register_queue("mem", Arc::new(MemoryQueue::new()));
    }

    #[test]
    fn names_are_listed() {
        let mut reg = registry_with_mem();
        reg.register_queue("slow", Arc::new(MemoryQueue::new()));
        reg.add_handler("a", "mem", noop()).unwrap();
        reg.add_handler("b", "slow", noop()).unwrap();

        let mut events = reg.event_names();
        events.sort();
        assert_eq!(events, vec![EventName::new("a"), EventName::new("b")]);

        let mut queues = reg.queue_names();
        queues.sort();
        assert_eq!(queues, vec![QueueName::new("mem"), QueueName::new("slow")]);
        assert_eq!(reg.queues().count(), 2);
        assert!(reg.queue("slow").is_some());
    }
}
