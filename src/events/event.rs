//! # Lifecycle events emitted by a task handle.
//!
//! The [`EventKind`] enum classifies events for subscription filtering:
//! - **StateChanged**: every state transition, in transition order
//! - **Completed**: the output of a successful execution
//! - **Failed**: the error of a failed construction or execution
//!
//! The [`Event`] struct wraps the [`HandleEvent`] payload with metadata
//! (per-handle sequence number, timestamp, task type name).
//!
//! ## Ordering guarantees
//! Sequence numbers are assigned per handle under its transition lock, so `seq`
//! increases strictly in the order transitions happened. A terminal
//! `StateChanged` is always immediately followed by its `Completed`/`Failed`.
//!
//! ## Example
//! ```rust
//! use taskhandle::{Event, EventKind, HandleEvent, TaskState};
//!
//! let ev: Event<()> = Event::new(7, "demo", HandleEvent::StateChanged(TaskState::Running));
//!
//! assert_eq!(ev.kind(), EventKind::StateChanged);
//! assert_eq!(ev.state(), Some(TaskState::Running));
//! assert_eq!(ev.seq, 7);
//! ```

use std::sync::Arc;
use std::time::SystemTime;

use crate::core::TaskState;
use crate::error::TaskError;

/// Classification of handle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The handle moved to a new state.
    StateChanged,
    /// An execution completed; carries the output.
    Completed,
    /// Construction or execution failed; carries the error.
    Failed,
}

impl EventKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::StateChanged => "state_changed",
            EventKind::Completed => "completed",
            EventKind::Failed => "failed",
        }
    }
}

/// Event payload.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleEvent<O> {
    /// The handle entered the given state.
    StateChanged(TaskState),
    /// Execution produced this output (follows `StateChanged(Complete)`).
    Completed(O),
    /// Construction or execution failed (follows `StateChanged(Failed)`).
    Failed(TaskError),
}

impl<O> HandleEvent<O> {
    /// Returns the kind of this payload.
    pub fn kind(&self) -> EventKind {
        match self {
            HandleEvent::StateChanged(_) => EventKind::StateChanged,
            HandleEvent::Completed(_) => EventKind::Completed,
            HandleEvent::Failed(_) => EventKind::Failed,
        }
    }
}

/// Handle event with metadata.
///
/// - `seq`: per-handle sequence, strictly increasing in transition order
/// - `at`: wall-clock timestamp (for logs)
/// - `task`: name of the task type the handle runs
#[derive(Debug, Clone)]
pub struct Event<O> {
    /// Per-handle sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Task type name of the emitting handle.
    pub task: Arc<str>,
    /// Payload.
    pub body: HandleEvent<O>,
}

impl<O> Event<O> {
    /// Creates an event stamped with the current time.
    pub fn new(seq: u64, task: impl Into<Arc<str>>, body: HandleEvent<O>) -> Self {
        Self {
            seq,
            at: SystemTime::now(),
            task: task.into(),
            body,
        }
    }

    /// Returns the kind of this event.
    #[inline]
    pub fn kind(&self) -> EventKind {
        self.body.kind()
    }

    /// The new state, for `StateChanged` events.
    #[inline]
    pub fn state(&self) -> Option<TaskState> {
        match self.body {
            HandleEvent::StateChanged(state) => Some(state),
            _ => None,
        }
    }

    /// The output, for `Completed` events.
    #[inline]
    pub fn output(&self) -> Option<&O> {
        match &self.body {
            HandleEvent::Completed(output) => Some(output),
            _ => None,
        }
    }

    /// The error, for `Failed` events.
    #[inline]
    pub fn error(&self) -> Option<&TaskError> {
        match &self.body {
            HandleEvent::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_follow_payload() {
        let done: Event<u32> = Event::new(1, "t", HandleEvent::Completed(5));
        assert_eq!(done.kind(), EventKind::Completed);
        assert_eq!(done.output(), Some(&5));
        assert_eq!(done.state(), None);
        assert_eq!(done.error(), None);

        let failed: Event<u32> = Event::new(2, "t", HandleEvent::Failed(TaskError::fail("x")));
        assert_eq!(failed.kind(), EventKind::Failed);
        assert_eq!(failed.error(), Some(&TaskError::fail("x")));
        assert_eq!(failed.output(), None);
        assert_eq!(&*failed.task, "t");
    }

    #[test]
    fn kind_labels() {
        assert_eq!(EventKind::StateChanged.as_label(), "state_changed");
        assert_eq!(EventKind::Completed.as_label(), "completed");
        assert_eq!(EventKind::Failed.as_label(), "failed");
    }
}
