//! Observability - default error sink
//!
//! Background failures are logged through `tracing`; the subscriber is the
//! application's business (see herald-cli).

use crate::error::EventError;
use crate::ports::ErrorHandler;

/// Logs every failure at `error` level with the event name and a short kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorHandler;

impl ErrorHandler for TracingErrorHandler {
    fn handle(&self, error: EventError) {
        let event = error.event().map(|e| e.as_str()).unwrap_or("-");
        tracing::error!(event, kind = kind(&error), error = %error, "event failed");
    }
}

fn kind(error: &EventError) -> &'static str {
    match error {
        EventError::HandlerNotAdded(_) => "handler_not_added",
        EventError::HandlerNotExist(_) => "handler_not_exist",
        EventError::Encode { .. } => "encode",
        EventError::Decode { .. } => "decode",
        EventError::Enqueue { .. } => "enqueue",
        EventError::Dequeue { .. } => "dequeue",
        EventError::Handler { .. } => "handler",
        EventError::Panicked { .. } => "panicked",
    }
}
