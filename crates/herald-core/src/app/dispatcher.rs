//! Dispatcher - trigger events and run the worker pool.
//!
//! # フロー
//! 1. `trigger(name, args)` looks up the binding and spawns a tracked task
//! 2. the task encodes `{name, args}` and enqueues it on the bound queue
//! 3. a worker of that queue dequeues, decodes and calls the handler
//! 4. failures from 2-3 go to the `ErrorHandler`
//!
//! `start` / `stop` bracket the lifetime of the workers. `stop` waits for
//! pending enqueues first, then stops every queue view, then joins every
//! worker, so nothing triggered before `stop` is silently dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::builder::DispatcherBuilder;
use super::guard::guarded;
use super::registry::Registry;
use super::reporter::Reporter;
use super::status::{PoolStatus, WorkerStatus};
use super::worker_loop::Worker;
use crate::domain::{EventName, QueueName};
use crate::error::EventError;
use crate::ports::{ErrorHandler, Queue};
use crate::typed::PayloadCodec;

/// Dispatcher is cheap to clone; clones share the same registry and workers.
///
/// Call `stop` before the last clone is dropped. Dropping it aborts the
/// workers where they stand: a handler may be cut off mid-call and events
/// still buffered stay in their queue.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Arc<Registry>,
    reporter: Reporter,
    codec: PayloadCodec,
    runtime: Handle,
    workers_per_queue: AtomicUsize,
    enqueues: TaskTracker,
    workers: Mutex<Vec<Worker>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        for worker in self.workers.get_mut().iter() {
            worker.abort();
        }
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub(crate) fn new(
        registry: Registry,
        error_handler: Arc<dyn ErrorHandler>,
        workers_per_queue: usize,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Arc::new(registry),
                reporter: Reporter::new(error_handler),
                codec: PayloadCodec::new(),
                runtime,
                workers_per_queue: AtomicUsize::new(workers_per_queue.max(1)),
                enqueues: TaskTracker::new(),
                workers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Emit the event `name`.
    ///
    /// `args` is a tuple (one argument per element), `()` (no arguments) or
    /// any other value (one argument):
    ///
    /// ```ignore
    /// dispatcher.trigger("log.error", "boom")?;            // ["boom"]
    /// dispatcher.trigger("user.created", (user, true))?;   // [user, true]
    /// dispatcher.trigger("batch", vec![1, 2, 3])?;         // [[1, 2, 3]]
    /// dispatcher.trigger("pair", ((1, 2),))?;              // [[1, 2]]
    /// dispatcher.trigger("ping", ())?;                     // []
    /// ```
    ///
    /// Arguments travel as JSON, so a non-finite float (`NaN`, infinity)
    /// arrives as `null`.
    ///
    /// Returns `HandlerNotAdded` if no handler is bound to `name`; that is the
    /// only error reported here. Encoding and enqueueing happen on a
    /// background task and report to the error handler.
    ///
    /// Does not need to be called from inside the runtime.
    pub fn trigger<A>(&self, name: &str, args: A) -> Result<(), EventError>
    where
        A: Serialize + Send + 'static,
    {
        let inner = &self.inner;
        let binding = inner
            .registry
            .binding(name)
            .ok_or_else(|| EventError::HandlerNotAdded(EventName::new(name)))?;
        let queue_name = binding.queue_name().clone();
        let queue = Arc::clone(binding.queue());

        let event = EventName::new(name);
        let codec = inner.codec;
        let reporter = inner.reporter.clone();
        inner.enqueues.spawn_on(
            async move {
                let context = format!("trigger `{event}`");
                let work = enqueue(codec, queue, queue_name, event.clone(), args);
                match guarded(&context, work).await {
                    Ok(Ok(())) => debug!(event = %event, "enqueued event"),
                    Ok(Err(err)) | Err(err) => reporter.report(err),
                }
            },
            &inner.runtime,
        );
        Ok(())
    }

    /// Number of workers started per queue by the next `start`.
    ///
    /// Clamped to at least 1. Workers that are already running are not
    /// affected.
    pub fn set_workers_per_queue(&self, n: usize) {
        self.inner
            .workers_per_queue
            .store(n.max(1), Ordering::Relaxed);
    }

    pub fn workers_per_queue(&self) -> usize {
        self.inner.workers_per_queue.load(Ordering::Relaxed)
    }

    /// Start `workers_per_queue` workers for every registered queue.
    ///
    /// Call once per start/stop cycle. If workers already exist this logs a
    /// warning and does nothing.
    pub async fn start(&self) {
        let inner = &self.inner;
        let mut workers = inner.workers.lock().await;
        if !workers.is_empty() {
            warn!(workers = workers.len(), "start called while workers are running; ignored");
            return;
        }

        let n = self.workers_per_queue();
        for (queue_name, queue) in inner.registry.queues() {
            for index in 0..n {
                let view = queue.instance(n);
                workers.push(Worker::spawn(
                    queue_name.clone(),
                    index,
                    view,
                    Arc::clone(&inner.registry),
                    inner.reporter.clone(),
                    &inner.runtime,
                ));
            }
        }
        info!(
            queues = inner.registry.queue_names().len(),
            workers_per_queue = n,
            workers = workers.len(),
            "event workers started"
        );
    }

    /// Wait for pending enqueues, stop every queue view, wait for every
    /// worker to exit. `start` may be called again afterwards.
    ///
    /// Events triggered while `stop` runs are not waited for; they stay in
    /// their queue for the next `start`.
    pub async fn stop(&self) {
        let inner = &self.inner;

        inner.enqueues.close();
        inner.enqueues.wait().await;
        inner.enqueues.reopen();

        let mut workers = inner.workers.lock().await;
        for worker in workers.iter() {
            worker.stop().await;
        }
        let count = workers.len();
        for worker in workers.drain(..) {
            if let Err(err) = worker.join().await {
                inner.reporter.report(err);
            }
        }
        info!(workers = count, "event workers stopped");
    }

    pub async fn worker_count(&self) -> usize {
        self.inner.workers.lock().await.len()
    }

    /// Triggered events whose enqueue has not finished yet.
    pub fn pending_enqueues(&self) -> usize {
        self.inner.enqueues.len()
    }

    pub async fn status(&self) -> PoolStatus {
        let workers = self.inner.workers.lock().await;
        let snapshot = workers
            .iter()
            .map(|w| WorkerStatus {
                queue: w.queue_name().clone(),
                index: w.index(),
                state: w.state(),
            })
            .collect();
        PoolStatus::new(self.workers_per_queue(), snapshot)
    }
}

async fn enqueue<A>(
    codec: PayloadCodec,
    queue: Arc<dyn Queue>,
    queue_name: QueueName,
    event: EventName,
    args: A,
) -> Result<(), EventError>
where
    A: Serialize,
{
    let data = match codec.encode(&event, &args) {
        Ok(data) => data,
        Err(source) => return Err(EventError::Encode { event, source }),
    };
    queue
        .enqueue(data)
        .await
        .map_err(|source| EventError::Enqueue {
            event,
            queue: queue_name,
            source,
        })
}
