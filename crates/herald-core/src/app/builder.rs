//! DispatcherBuilder - 登録とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターン
//! - 起動時検証（Fail-fast 設計）
//! - build 後の Registry は不変（Arc に凍結）

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::runtime::Handle;

use super::dispatcher::Dispatcher;
use super::registry::{Registry, RegistryError};
use crate::config::DispatcherConfig;
use crate::domain::{EventName, QueueName};
use crate::ports::{ErrorHandler, NoopErrorHandler, Queue};
use crate::typed::{EventHandler, Handler};

/// DispatcherBuilder wires queues, handlers and the error handler together.
///
/// # 使用例
/// ```ignore
/// let dispatcher = Dispatcher::builder()
///     .register_queue("mem", Arc::new(MemoryQueue::new()))
///     .add_handler("log.error", "mem", handler_fn(log_error))?
///     .expect_events(&["log.error"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_events() で期待されるイベント名を登録
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
/// - 不足があれば BuildError を返す
pub struct DispatcherBuilder {
    registry: Registry,
    expected_events: Option<Vec<String>>,
    workers_per_queue: usize,
    error_handler: Arc<dyn ErrorHandler>,
    runtime: Option<Handle>,
}

/// BuildError はディスパッチャ構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing event handlers: {0:?}. These events were expected but not added.")]
    MissingEvents(Vec<String>),

    #[error("no Tokio runtime: call build() inside a runtime or pass a handle with runtime()")]
    NoRuntime,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// Start from a registry populated elsewhere.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            expected_events: None,
            workers_per_queue: 1,
            error_handler: Arc::new(NoopErrorHandler),
            runtime: None,
        }
    }

    /// # Panics
    /// If `name` is already registered.
    pub fn register_queue(mut self, name: impl Into<QueueName>, queue: Arc<dyn Queue>) -> Self {
        self.registry.register_queue(name, queue);
        self
    }

    pub fn add_handler<H>(
        mut self,
        name: impl Into<EventName>,
        queue_name: impl Into<QueueName>,
        handler: H,
    ) -> Result<Self, RegistryError>
    where
        H: EventHandler + 'static,
    {
        self.registry
            .add_handler(name, queue_name, Arc::new(handler))?;
        Ok(self)
    }

    pub fn add_typed_handler<A, H>(
        mut self,
        name: impl Into<EventName>,
        queue_name: impl Into<QueueName>,
        handler: H,
    ) -> Result<Self, RegistryError>
    where
        A: DeserializeOwned + Send + 'static,
        H: Handler<A> + 'static,
    {
        self.registry
            .add_typed_handler::<A, H>(name, queue_name, handler)?;
        Ok(self)
    }

    pub fn workers_per_queue(mut self, n: usize) -> Self {
        self.workers_per_queue = n.max(1);
        self
    }

    /// Apply the dispatcher-level settings of `config`.
    pub fn config(self, config: &DispatcherConfig) -> Self {
        self.workers_per_queue(config.effective_workers_per_queue())
    }

    /// Receives background failures. Defaults to `NoopErrorHandler`; use
    /// `TracingErrorHandler` to log them.
    pub fn error_handler<E>(mut self, handler: E) -> Self
    where
        E: ErrorHandler + 'static,
    {
        self.error_handler = Arc::new(handler);
        self
    }

    /// Runtime the dispatcher spawns onto. Defaults to the current one.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn expect_events(mut self, names: &[&str]) -> Self {
        self.expected_events = Some(names.iter().map(|name| name.to_string()).collect());
        self
    }

    /// # 検証
    /// - expect_events() のイベントが全て登録されているか
    /// - ランタイムが指定されているか、現在のコンテキストにあるか
    pub fn build(self) -> Result<Dispatcher, BuildError> {
        if let Some(expected) = &self.expected_events {
            let missing: Vec<String> = expected
                .iter()
                .filter(|name| !self.registry.contains_event(name))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingEvents(missing));
            }
        }

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| BuildError::NoRuntime)?,
        };

        tracing::debug!(
            events = self.registry.len(),
            queues = self.registry.queue_names().len(),
            workers_per_queue = self.workers_per_queue,
            "built dispatcher"
        );
        Ok(Dispatcher::new(
            self.registry,
            self.error_handler,
            self.workers_per_queue,
            runtime,
        ))
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Args, HandlerError};
    use crate::impls::MemoryQueue;
    use crate::typed::handler_fn;

    fn noop() -> impl EventHandler + 'static {
        handler_fn(|_args: Args| async { Ok::<(), HandlerError>(()) })
    }

    #[tokio::test]
    async fn test_build_success() {
        let dispatcher = DispatcherBuilder::new()
            .register_queue("mem", Arc::new(MemoryQueue::new()))
            .add_handler("log.error", "mem", noop())
            .unwrap()
            .expect_events(&["log.error"])
            .build();
        assert!(dispatcher.is_ok());
    }

    #[tokio::test]
    async fn test_build_missing_events() {
        let result = DispatcherBuilder::new()
            .register_queue("mem", Arc::new(MemoryQueue::new()))
            .add_handler("log.error", "mem", noop())
            .unwrap()
            .expect_events(&["log.error", "user.created"])
            .build();
        assert!(matches!(
            result,
            Err(BuildError::MissingEvents(missing)) if missing == vec!["user.created".to_string()]
        ));
    }

    #[test]
    fn test_build_without_runtime() {
        let result = DispatcherBuilder::new().build();
        assert!(matches!(result, Err(BuildError::NoRuntime)));
    }

    #[test]
    fn test_build_with_explicit_runtime() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let dispatcher = DispatcherBuilder::new()
            .runtime(rt.handle().clone())
            .build()
            .unwrap();
        assert_eq!(dispatcher.workers_per_queue(), 1);
    }

    #[test]
    fn test_add_handler_unknown_queue() {
        let result = DispatcherBuilder::new().add_handler("log.error", "missing", noop());
        assert!(matches!(result, Err(RegistryError::QueueNotRegistered(_))));
    }

    #[tokio::test]
    async fn test_config_sets_workers() {
        let config = DispatcherConfig {
            workers_per_queue: 0,
            ..Default::default()
        };
        let dispatcher = DispatcherBuilder::new().config(&config).build().unwrap();
        assert_eq!(dispatcher.workers_per_queue(), 1);

        let config = DispatcherConfig {
            workers_per_queue: 3,
            ..Default::default()
        };
        let dispatcher = DispatcherBuilder::new().config(&config).build().unwrap();
        assert_eq!(dispatcher.workers_per_queue(), 3);
    }
}
