//! herald-core
//!
//! In-process event dispatcher: named events are triggered with arguments,
//! serialized onto a pluggable background queue and handled by a pool of
//! async workers.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（EventName, QueueName, Args, Payload, errors）
//! - **ports**: 抽象化レイヤー（Queue, ErrorHandler）
//! - **app**: アプリケーションロジック（builder, registry, dispatcher, worker_loop, status）
//! - **typed**: 型付き Handler API と PayloadCodec
//! - **impls**: 実装（MemoryQueue）
//! - **config**: DispatcherConfig（JSON + 環境変数）
//! - **observability**: TracingErrorHandler
//!
//! # 使用例
//! ```ignore
//! let dispatcher = Dispatcher::builder()
//!     .register_queue("mem", Arc::new(MemoryQueue::new()))
//!     .add_handler("log.error", "mem", handler_fn(|args: Args| async move {
//!         let msg: String = args.get(0)?;
//!         eprintln!("{msg}");
//!         Ok(())
//!     }))?
//!     .build()?;
//!
//! dispatcher.start().await;
//! dispatcher.trigger("log.error", ("boom",))?;
//! dispatcher.stop().await;
//! ```

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod typed;

pub use app::{BuildError, Dispatcher, DispatcherBuilder, PoolStatus, Registry, RegistryError, WorkerState};
pub use config::{ConfigError, DispatcherConfig};
pub use domain::{Args, EventName, HandlerError, Payload, QueueName};
pub use error::EventError;
pub use impls::MemoryQueue;
pub use observability::TracingErrorHandler;
pub use ports::{ErrorHandler, NoopErrorHandler, Queue, QueueError};
pub use typed::{EventHandler, Handler, PayloadCodec, handler_fn};
