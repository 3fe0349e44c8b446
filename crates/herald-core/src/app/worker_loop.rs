//! WorkerLoop - dequeue → decode → look up → invoke → report
//!
//! One worker owns one view of one queue. The loop only ends when the view
//! reports `QueueError::Done`; every other failure is reported and the loop
//! keeps going.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::app::guard::guarded;
use crate::app::registry::Registry;
use crate::app::reporter::Reporter;
use crate::app::state::WorkerState;
use crate::domain::QueueName;
use crate::error::EventError;
use crate::ports::{Queue, QueueError};
use crate::typed::PayloadCodec;

/// Handle to a spawned worker, kept in the dispatcher's worker collection.
pub(crate) struct Worker {
    queue_name: QueueName,
    index: usize,
    view: Arc<dyn Queue>,
    state: Arc<watch::Sender<WorkerState>>,
    join: JoinHandle<()>,
}

impl Worker {
    pub(crate) fn spawn(
        queue_name: QueueName,
        index: usize,
        view: Arc<dyn Queue>,
        registry: Arc<Registry>,
        reporter: Reporter,
        runtime: &Handle,
    ) -> Self {
        let (state_tx, _) = watch::channel(WorkerState::Idle);
        let state = Arc::new(state_tx);

        let worker_loop = WorkerLoop {
            queue_name: queue_name.clone(),
            index,
            view: Arc::clone(&view),
            registry,
            reporter,
            codec: PayloadCodec::new(),
            state: Arc::clone(&state),
        };
        let join = runtime.spawn(worker_loop.run());

        Self {
            queue_name,
            index,
            view,
            state,
            join,
        }
    }

    pub(crate) fn queue_name(&self) -> &QueueName {
        &self.queue_name
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Mark the worker as stopping and stop its queue view.
    pub(crate) async fn stop(&self) {
        self.state
            .send_if_modified(|s| s.transition(WorkerState::Stopping));
        self.view.stop().await;
    }

    /// Cancel the loop without stopping the view.
    pub(crate) fn abort(&self) {
        self.join.abort();
    }

    /// Wait for the loop to exit.
    pub(crate) async fn join(self) -> Result<(), EventError> {
        let context = format!("worker {}#{}", self.queue_name, self.index);
        match self.join.await {
            Ok(()) => Ok(()),
            Err(err) if err.is_panic() => Err(EventError::Panicked {
                context,
                message: crate::app::guard::panic_message(err.into_panic()),
            }),
            Err(err) => Err(EventError::Panicked {
                context,
                message: err.to_string(),
            }),
        }
    }
}

struct WorkerLoop {
    queue_name: QueueName,
    index: usize,
    view: Arc<dyn Queue>,
    registry: Arc<Registry>,
    reporter: Reporter,
    codec: PayloadCodec,
    state: Arc<watch::Sender<WorkerState>>,
}

impl WorkerLoop {
    async fn run(self) {
        self.state
            .send_if_modified(|s| s.transition(WorkerState::Running));
        debug!(queue = %self.queue_name, worker = self.index, "worker started");

        loop {
            let data = match self.view.dequeue().await {
                Ok(data) => data,
                Err(QueueError::Done) => break,
                Err(source) => {
                    self.reporter.report(EventError::Dequeue {
                        queue: self.queue_name.clone(),
                        source,
                    });
                    // バックエンドが即座にエラーを返し続ける場合でも他のタスクを飢えさせない
                    tokio::task::yield_now().await;
                    continue;
                }
            };

            self.dispatch(&data).await;
        }

        self.state
            .send_if_modified(|s| s.transition(WorkerState::Stopped));
        info!(queue = %self.queue_name, worker = self.index, "worker stopped");
    }

    async fn dispatch(&self, data: &str) {
        let payload = match self.codec.decode(data) {
            Ok(payload) => payload,
            Err(source) => {
                self.reporter.report(EventError::Decode {
                    queue: self.queue_name.clone(),
                    source,
                });
                return;
            }
        };

        let (event, args) = payload.into_parts();
        let Some(binding) = self.registry.binding(event.as_str()) else {
            self.reporter.report(EventError::HandlerNotExist(event));
            return;
        };

        let handler = Arc::clone(binding.handler());
        let context = format!("handler `{event}`");
        match guarded(&context, async move { handler.handle(args).await }).await {
            Ok(Ok(())) => {
                debug!(event = %event, queue = %self.queue_name, worker = self.index, "handled event");
            }
            Ok(Err(source)) => self.reporter.report(EventError::Handler { event, source }),
            Err(panicked) => self.reporter.report(panicked),
        }
    }
}
