//! Worker state machine.

use serde::{Deserialize, Serialize};

/// Worker state.
///
/// State transitions:
/// - Idle -> Running -> Stopping -> Stopped
/// - Idle -> Stopping (stop requested before the loop got scheduled)
/// - Running -> Stopped (the queue reported done on its own)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Created, loop not yet running.
    Idle,

    /// Dequeue loop is running.
    Running,

    /// Stop requested, waiting for the loop to observe done.
    Stopping,

    /// Loop has exited.
    Stopped,
}

impl WorkerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkerState::Stopped)
    }

    pub fn can_transition_to(self, next: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, next),
            (Idle, Running) | (Idle, Stopping) | (Running, Stopping) | (Running, Stopped) | (Stopping, Stopped)
        )
    }

    /// Move to `next` if allowed. Returns whether the state changed.
    ///
    /// Shaped for `watch::Sender::send_if_modified`.
    pub fn transition(&mut self, next: WorkerState) -> bool {
        if self.can_transition_to(next) {
            *self = next;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::start(WorkerState::Idle, WorkerState::Running)]
    #[case::stop_before_start(WorkerState::Idle, WorkerState::Stopping)]
    #[case::stop(WorkerState::Running, WorkerState::Stopping)]
    #[case::done(WorkerState::Stopping, WorkerState::Stopped)]
    #[case::self_done(WorkerState::Running, WorkerState::Stopped)]
    fn allowed_transitions(#[case] from: WorkerState, #[case] to: WorkerState) {
        let mut state = from;
        assert!(state.transition(to));
        assert_eq!(state, to);
    }

    #[rstest]
    #[case::restart(WorkerState::Stopped, WorkerState::Running)]
    #[case::back_to_running(WorkerState::Stopping, WorkerState::Running)]
    #[case::skip_loop(WorkerState::Idle, WorkerState::Stopped)]
    #[case::same(WorkerState::Running, WorkerState::Running)]
    fn rejected_transitions(#[case] from: WorkerState, #[case] to: WorkerState) {
        let mut state = from;
        assert!(!state.transition(to));
        assert_eq!(state, from);
    }

    #[test]
    fn only_stopped_is_terminal() {
        assert!(WorkerState::Stopped.is_terminal());
        assert!(!WorkerState::Stopping.is_terminal());
    }
}
