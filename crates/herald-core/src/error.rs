use thiserror::Error;

use crate::domain::{CodecError, EventName, HandlerError, QueueName};
use crate::ports::QueueError;

/// EventError covers the failures of triggering and dispatching events.
///
/// Only `HandlerNotAdded` is ever returned to a caller (from `trigger`).
/// Every other variant happens on a background task and goes to the
/// dispatcher's `ErrorHandler`.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("handler `{0}` isn't added")]
    HandlerNotAdded(EventName),

    /// A dequeued event has no bound handler.
    #[error("handler not exist: `{0}`")]
    HandlerNotExist(EventName),

    #[error("encode payload for `{event}`: {source}")]
    Encode {
        event: EventName,
        #[source]
        source: CodecError,
    },

    #[error("decode payload from queue `{queue}`: {source}")]
    Decode {
        queue: QueueName,
        #[source]
        source: CodecError,
    },

    #[error("enqueue `{event}` on queue `{queue}`: {source}")]
    Enqueue {
        event: EventName,
        queue: QueueName,
        #[source]
        source: QueueError,
    },

    #[error("dequeue from queue `{queue}`: {source}")]
    Dequeue {
        queue: QueueName,
        #[source]
        source: QueueError,
    },

    #[error("handler `{event}` failed: {source}")]
    Handler {
        event: EventName,
        #[source]
        source: HandlerError,
    },

    #[error("panicked in {context}: {message}")]
    Panicked { context: String, message: String },
}

impl EventError {
    /// Event the failure belongs to, when one is known.
    pub fn event(&self) -> Option<&EventName> {
        match self {
            EventError::HandlerNotAdded(event)
            | EventError::HandlerNotExist(event)
            | EventError::Encode { event, .. }
            | EventError::Enqueue { event, .. }
            | EventError::Handler { event, .. } => Some(event),
            EventError::Decode { .. } | EventError::Dequeue { .. } | EventError::Panicked { .. } => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_messages() {
        let err = EventError::HandlerNotExist(EventName::new("log.error"));
        assert!(err.to_string().contains("handler not exist"));

        let err = EventError::Dequeue {
            queue: QueueName::new("mem"),
            source: QueueError::Done,
        };
        assert!(err.to_string().contains("queue is done"));
    }

    #[test]
    fn event_accessor() {
        let err = EventError::Handler {
            event: EventName::new("user.created"),
            source: HandlerError::new("boom"),
        };
        assert_eq!(err.event().map(EventName::as_str), Some("user.created"));

        let err = EventError::Panicked {
            context: "worker".into(),
            message: "boom".into(),
        };
        assert!(err.event().is_none());
    }
}
