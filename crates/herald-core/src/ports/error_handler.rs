//! ErrorHandler port - sink for asynchronous failures.
//!
//! Triggering is fire-and-forget and workers run in the background, so their
//! failures cannot be returned to anyone. They are handed to an
//! `ErrorHandler` instead.
//!
//! # 実装
//! - `NoopErrorHandler`: 何もしない（デフォルト）
//! - `TracingErrorHandler` (observability): `tracing` にログ出力
//! - `Fn(EventError)` クロージャもそのまま使える

use crate::error::EventError;

/// ErrorHandler receives every failure raised outside the caller's stack.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, error: EventError);
}

impl<F> ErrorHandler for F
where
    F: Fn(EventError) + Send + Sync,
{
    fn handle(&self, error: EventError) {
        self(error)
    }
}

/// Drops every error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopErrorHandler;

impl ErrorHandler for NoopErrorHandler {
    fn handle(&self, _error: EventError) {}
}
