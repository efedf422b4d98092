//! # LogWriter: tracing-backed event printer
//!
//! A minimal subscriber that forwards incoming [`Event`]s to `tracing`.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! INFO state changed task="reports.nightly" seq=0 state=running
//! INFO state changed task="reports.nightly" seq=1 state=complete
//! INFO completed task="reports.nightly" seq=2 output=Report { rows: 42 }
//! WARN failed task="reports.nightly" seq=5 label="task_failed" error=db unreachable
//! ```

use std::fmt::Debug;

use async_trait::async_trait;

use crate::events::{Event, HandleEvent};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<O> Subscribe<O> for LogWriter
where
    O: Debug + Send + Sync + 'static,
{
    async fn on_event(&self, e: &Event<O>) {
        match &e.body {
            HandleEvent::StateChanged(state) => {
                tracing::info!(task = %e.task, seq = e.seq, state = %state, "state changed");
            }
            HandleEvent::Completed(output) => {
                tracing::info!(task = %e.task, seq = e.seq, output = ?output, "completed");
            }
            HandleEvent::Failed(err) => {
                tracing::warn!(
                    task = %e.task,
                    seq = e.seq,
                    label = err.as_label(),
                    error = %err,
                    "failed"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TaskState;
    use crate::error::TaskError;

    #[tokio::test]
    async fn writes_every_event_kind() {
        let writer = LogWriter::new();
        assert_eq!(Subscribe::<u8>::name(&writer), "log-writer");

        writer
            .on_event(&Event::new(0, "t", HandleEvent::<u8>::StateChanged(TaskState::Running)))
            .await;
        writer.on_event(&Event::new(1, "t", HandleEvent::Completed(7u8))).await;
        writer
            .on_event(&Event::new(2, "t", HandleEvent::<u8>::Failed(TaskError::fail("boom"))))
            .await;
    }
}
