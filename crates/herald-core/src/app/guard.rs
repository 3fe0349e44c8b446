//! Panic isolation for background work.
//!
//! The future runs on its own Tokio task; if it panics, the `JoinError`
//! carries the payload and we turn it into a message instead of letting the
//! panic take the caller down.

use std::any::Any;
use std::future::Future;

use crate::error::EventError;

/// Run `fut` on a separate task and catch a panic as `EventError::Panicked`.
pub(crate) async fn guarded<F, T>(context: &str, fut: F) -> Result<T, EventError>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(fut).await {
        Ok(value) => Ok(value),
        Err(join_err) if join_err.is_panic() => Err(EventError::Panicked {
            context: context.to_string(),
            message: panic_message(join_err.into_panic()),
        }),
        Err(join_err) => Err(EventError::Panicked {
            context: context.to_string(),
            message: join_err.to_string(),
        }),
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_value_through() {
        let value = guarded("test", async { 41 + 1 }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn panic_becomes_error() {
        let explode = true;
        let err = guarded("handler `x`", async move {
            if explode {
                panic!("kaboom");
            }
        })
        .await
        .unwrap_err();

        match err {
            EventError::Panicked { context, message } => {
                assert_eq!(context, "handler `x`");
                assert_eq!(message, "kaboom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn formatted_panic_message_is_kept() {
        let n = 3;
        let err = guarded("t", async move {
            if n > 2 {
                panic!("too many: {n}");
            }
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("too many: 3"));
    }
}
