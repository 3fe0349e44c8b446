//! MemoryQueue - 開発用・テスト用のインメモリキュー
//!
//! # 実装詳細
//! - `VecDeque<(seq, String)>` を Mutex で保護（全ビューで共有）
//! - `Notify` で enqueue 時に待機中の dequeue を起こす
//! - ビューごとに `CancellationToken`（停止）と `TaskTracker`（実行中の操作）を持つ
//! - `stop()` は その時点の seq を記録し、停止したビューはそれより前の分だけ返す
//!
//! `instance()` returns a fresh view over the same buffer, so stopping the
//! views of one start/stop cycle does not affect the master instance or the
//! views of the next cycle.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::ports::{Queue, QueueError};

struct Shared {
    buffer: Mutex<Buffer>,
    notify: Notify,
    capacity: Option<usize>,
}

impl Shared {
    fn buffer(&self) -> MutexGuard<'_, Buffer> {
        // 中身は String の列と連番だけなので poison されても整合性は壊れない
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
struct Buffer {
    items: VecDeque<(u64, String)>,
    next_seq: u64,
}

impl Buffer {
    fn push(&mut self, data: String) {
        self.items.push_back((self.next_seq, data));
        self.next_seq += 1;
    }

    /// Pop the oldest item, if it was enqueued before `cutoff`.
    fn pop_before(&mut self, cutoff: Option<u64>) -> Option<String> {
        match self.items.front() {
            Some((seq, _)) if cutoff.is_none_or(|c| *seq < c) => {
                self.items.pop_front().map(|(_, data)| data)
            }
            _ => None,
        }
    }
}

/// MemoryQueue is a FIFO queue held in process memory.
///
/// # 使用例
/// ```ignore
/// let mut registry = Registry::new();
/// registry.register_queue("mem", Arc::new(MemoryQueue::with_capacity(1024)));
/// ```
pub struct MemoryQueue {
    shared: Arc<Shared>,
    stopped: CancellationToken,
    /// First seq this view will not return once stopped.
    drain_until: OnceLock<u64>,
    in_flight: TaskTracker,
}

impl MemoryQueue {
    /// Unbounded queue.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Queue rejecting `enqueue` with `QueueError::Full` past `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(Some(capacity))
    }

    fn build(capacity: Option<usize>) -> Self {
        Self::view(Arc::new(Shared {
            buffer: Mutex::new(Buffer::default()),
            notify: Notify::new(),
            capacity,
        }))
    }

    fn view(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            stopped: CancellationToken::new(),
            drain_until: OnceLock::new(),
            in_flight: TaskTracker::new(),
        }
    }

    /// Number of buffered items (shared by all views).
    pub fn len(&self) -> usize {
        self.shared.buffer().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.is_cancelled()
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Queue for MemoryQueue {
    fn instance(&self, _workers: usize) -> Arc<dyn Queue> {
        Arc::new(Self::view(Arc::clone(&self.shared)))
    }

    async fn enqueue(&self, data: String) -> Result<(), QueueError> {
        let _op = self.in_flight.token();
        if self.stopped.is_cancelled() {
            return Err(QueueError::Done);
        }
        {
            let mut buffer = self.shared.buffer();
            if let Some(capacity) = self.shared.capacity
                && buffer.items.len() >= capacity
            {
                return Err(QueueError::Full { capacity });
            }
            buffer.push(data);
        }
        self.shared.notify.notify_one();
        Ok(())
    }

    async fn dequeue(&self) -> Result<String, QueueError> {
        let _op = self.in_flight.token();
        loop {
            // 先に enable しておかないと、pop と待機の間の notify_one を取りこぼす
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut buffer = self.shared.buffer();
                let cutoff = self.drain_until.get().copied();
                if let Some(data) = buffer.pop_before(cutoff) {
                    return Ok(data);
                }
                // stop 前に積まれた分は返し切り、後の分は次のビューに残す
                if cutoff.is_some() {
                    if !buffer.items.is_empty() {
                        self.shared.notify.notify_one();
                    }
                    return Err(QueueError::Done);
                }
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = self.stopped.cancelled() => {}
            }
        }
    }

    async fn stop(&self) {
        {
            let buffer = self.shared.buffer();
            // 二度目の stop は最初の位置を保つ
            let _ = self.drain_until.set(buffer.next_seq);
        }
        self.stopped.cancel();
        self.in_flight.close();
        self.in_flight.wait().await;
    }
}
