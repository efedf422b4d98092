//! # Handle lifecycle states and control-operation results.
//!
//! ```text
//!             run() [condition]            execute Ok
//!   Waiting ───────────────────► Running ───────────────► Complete
//!      ▲                        │  ▲   │  execute Err
//!      │ reset()      suspend() │  │   └────────────────► Failed
//!      │                        ▼  │ resume()
//!      │                     Suspended
//!      │                        │
//!      │          kill() (from Running or Suspended)
//!      │                        ▼
//!      └──────────────────── Killed ──── run() [condition] ──► Running (fresh instance)
//! ```

use std::fmt;

/// Current lifecycle state of a [`TaskHandle`](crate::TaskHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskState {
    /// Created, not started (or reset).
    #[default]
    Waiting,
    /// An execution is in flight.
    Running,
    /// The in-flight execution is paused by its task.
    Suspended,
    /// The last execution produced an output.
    Complete,
    /// Construction or execution failed.
    Failed,
    /// The last execution was forcibly terminated.
    Killed,
}

impl TaskState {
    /// True while a task instance and execution unit exist.
    #[inline]
    pub fn is_live(self) -> bool {
        matches!(self, TaskState::Running | TaskState::Suspended)
    }

    /// True for states that only `run()` (Killed) or `reset()` can leave.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Complete | TaskState::Failed | TaskState::Killed
        )
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            TaskState::Waiting => "waiting",
            TaskState::Running => "running",
            TaskState::Suspended => "suspended",
            TaskState::Complete => "complete",
            TaskState::Failed => "failed",
            TaskState::Killed => "killed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Outcome of [`TaskHandle::suspend`](crate::TaskHandle::suspend).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendResult {
    /// The task paused; the handle is now `Suspended`.
    Suspended,
    /// Not running, not suspendable, or the task refused; state unchanged.
    Failed,
}

/// Outcome of [`TaskHandle::resume`](crate::TaskHandle::resume).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeResult {
    /// The task continued; the handle is now `Running`.
    Resumed,
    /// Not suspended, or the task refused; state unchanged.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_and_terminal_are_disjoint() {
        let all = [
            TaskState::Waiting,
            TaskState::Running,
            TaskState::Suspended,
            TaskState::Complete,
            TaskState::Failed,
            TaskState::Killed,
        ];
        for state in all {
            assert!(!(state.is_live() && state.is_terminal()), "{state}");
        }
        assert!(!TaskState::Waiting.is_live());
        assert!(!TaskState::Waiting.is_terminal());
        assert_eq!(TaskState::default(), TaskState::Waiting);
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(TaskState::Suspended.to_string(), "suspended");
        assert_eq!(TaskState::Killed.as_label(), "killed");
    }
}
