//! Status - worker pool snapshot

use serde::{Deserialize, Serialize};

use super::state::WorkerState;
use crate::domain::QueueName;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub queue: QueueName,
    pub index: usize,
    pub state: WorkerState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerCounts {
    pub idle: usize,
    pub running: usize,
    pub stopping: usize,
    pub stopped: usize,
}

impl WorkerCounts {
    pub fn total(&self) -> usize {
        self.idle + self.running + self.stopping + self.stopped
    }
}

/// Snapshot of the worker collection at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    pub workers_per_queue: usize,
    pub workers: Vec<WorkerStatus>,
    pub counts: WorkerCounts,
}

impl PoolStatus {
    pub(crate) fn new(workers_per_queue: usize, mut workers: Vec<WorkerStatus>) -> Self {
        workers.sort_by(|a, b| a.queue.cmp(&b.queue).then(a.index.cmp(&b.index)));
        let mut counts = WorkerCounts::default();
        for worker in &workers {
            match worker.state {
                WorkerState::Idle => counts.idle += 1,
                WorkerState::Running => counts.running += 1,
                WorkerState::Stopping => counts.stopping += 1,
                WorkerState::Stopped => counts.stopped += 1,
            }
        }
        Self {
            workers_per_queue,
            workers,
            counts,
        }
    }

    /// Workers of one queue.
    pub fn for_queue<'a>(&'a self, queue: &'a str) -> impl Iterator<Item = &'a WorkerStatus> + 'a {
        self.workers.iter().filter(move |w| w.queue.as_str() == queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(queue: &str, index: usize, state: WorkerState) -> WorkerStatus {
        WorkerStatus {
            queue: QueueName::new(queue),
            index,
            state,
        }
    }

    #[test]
    fn counts_by_state_and_sorts() {
        let status = PoolStatus::new(
            2,
            vec![
                worker("b", 1, WorkerState::Running),
                worker("a", 1, WorkerState::Stopping),
                worker("a", 0, WorkerState::Running),
                worker("b", 0, WorkerState::Idle),
            ],
        );

        assert_eq!(status.counts.running, 2);
        assert_eq!(status.counts.stopping, 1);
        assert_eq!(status.counts.idle, 1);
        assert_eq!(status.counts.total(), 4);
        assert_eq!(status.workers[0], worker("a", 0, WorkerState::Running));
        assert_eq!(status.for_queue("b").count(), 2);
    }

    #[test]
    fn serializes_states_in_snake_case() {
        let status = PoolStatus::new(1, vec![worker("mem", 0, WorkerState::Running)]);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["workers"][0]["state"], "running");
        assert_eq!(json["counts"]["running"], 1);
    }
}
