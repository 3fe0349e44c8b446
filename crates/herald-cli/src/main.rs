use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, sleep};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use herald_core::{
    Args, Dispatcher, DispatcherConfig, Handler, HandlerError, MemoryQueue, TracingErrorHandler,
    handler_fn,
};

#[derive(Debug, Serialize, Deserialize)]
struct User {
    id: u64,
    email: String,
}

/// `user.created` の型付きハンドラ：引数は (User, 招待経由か)
struct WelcomeUser {
    handled: Arc<AtomicUsize>,
}

#[async_trait]
impl Handler<(User, bool)> for WelcomeUser {
    async fn handle(&self, (user, invited): (User, bool)) -> Result<(), HandlerError> {
        if user.email.is_empty() {
            return Err(HandlerError::new(format!("user {} has no email", user.id)));
        }
        println!("welcome, {} (id={}, invited={invited})", user.email, user.id);
        self.handled.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // (A) 設定（HERALD_WORKERS_PER_QUEUE / HERALD_QUEUE_CAPACITY）
    let config = DispatcherConfig::from_env()?;
    let queue = match config.queue_capacity {
        Some(capacity) => MemoryQueue::with_capacity(capacity),
        None => MemoryQueue::new(),
    };

    // (B) queue と handler を登録
    let handled = Arc::new(AtomicUsize::new(0));
    let log_error = {
        let handled = Arc::clone(&handled);
        handler_fn(move |args: Args| {
            let handled = Arc::clone(&handled);
            async move {
                let msg: String = args.get(0)?;
                eprintln!("log.error: {msg}");
                handled.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
        })
    };

    let dispatcher = Dispatcher::builder()
        .config(&config)
        .register_queue("mem", Arc::new(queue))
        .add_handler("log.error", "mem", log_error)?
        .add_typed_handler::<(User, bool), _>(
            "user.created",
            "mem",
            WelcomeUser {
                handled: Arc::clone(&handled),
            },
        )?
        .expect_events(&["log.error", "user.created"])
        .error_handler(TracingErrorHandler)
        .build()?;

    // (C) start 前に trigger してもキューに溜まる
    dispatcher.trigger("log.error", "boom")?;
    dispatcher.start().await;

    dispatcher.trigger(
        "user.created",
        (
            User {
                id: 1,
                email: "ada@example.com".into(),
            },
            true,
        ),
    )?;
    // 失敗はエラーハンドラ（TracingErrorHandler）に流れる
    dispatcher.trigger(
        "user.created",
        (
            User {
                id: 2,
                email: String::new(),
            },
            false,
        ),
    )?;
    if let Err(err) = dispatcher.trigger("nobody.listens", ()) {
        tracing::warn!(error = %err, "trigger rejected");
    }

    // (D) 処理を待ってからステータスを出す
    for _ in 0..100 {
        if handled.load(Ordering::Relaxed) >= 2 {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    let status = dispatcher.status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);

    // (E) 停止：未処理の trigger を流し切ってから worker を止める
    dispatcher.stop().await;
    println!("handled {} events", handled.load(Ordering::Relaxed));
    Ok(())
}
