//! Funnel from background failures to the configured `ErrorHandler`.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::app::guard::panic_message;
use crate::error::EventError;
use crate::ports::ErrorHandler;

#[derive(Clone)]
pub(crate) struct Reporter {
    handler: Arc<dyn ErrorHandler>,
}

impl Reporter {
    pub(crate) fn new(handler: Arc<dyn ErrorHandler>) -> Self {
        Self { handler }
    }

    /// Hand `error` to the error handler. A panicking error handler is logged
    /// and otherwise ignored; it must not unwind into a worker.
    pub(crate) fn report(&self, error: EventError) {
        tracing::debug!(error = %error, "reporting event failure");
        let handler = &self.handler;
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| handler.handle(error))) {
            tracing::error!(
                panic = %panic_message(payload),
                "error handler panicked"
            );
        }
    }
}
