//! Ports - 抽象化レイヤー
//!
//! Seams where applications plug in their own implementations:
//! - `Queue`: background queue backend (memory, file, broker, ...)
//! - `ErrorHandler`: sink for failures that happen off the caller's stack

pub mod error_handler;
pub mod queue;

pub use self::error_handler::{ErrorHandler, NoopErrorHandler};
pub use self::queue::{Queue, QueueError};
