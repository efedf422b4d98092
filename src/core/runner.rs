//! # Drive a single execution of a task instance.
//!
//! This is the body of the tokio task a handle spawns on `run()`.
//!
//! ## Flow
//! ```text
//! execute(input) ──► Ok(output) ─┐
//!                ──► Err(e)     ─┼─► clean_up (once) ──► Shared::settle(epoch, outcome)
//!                ──► panic      ─┘                       (takes the transition lock)
//!
//! token cancelled at any point ──► return immediately (kill/dispose owns cleanup)
//! ```
//!
//! ## Rules
//! - The whole body races the run's [`CancellationToken`](tokio_util::sync::CancellationToken),
//!   including the wait for the transition lock, so `kill()` never deadlocks with a finishing run.
//! - Panics in `execute` are captured and reported as [`TaskError::Panicked`].
//! - The outcome is decided by `execute` alone; cleanup failures are only logged.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::error::TaskError;

use super::actor::RunUnit;
use super::handle::Shared;

/// Executes `unit` once and settles its outcome on `shared`, unless cancelled first.
pub(super) async fn run_once<I, O>(shared: Arc<Shared<I, O>>, unit: Arc<RunUnit<I, O>>, input: I)
where
    I: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    let token = unit.token.clone();
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            tracing::debug!(task = %shared.task_type(), epoch = unit.epoch, "execution cancelled");
        }
        _ = drive(&shared, &unit, input) => {}
    }
}

async fn drive<I, O>(shared: &Shared<I, O>, unit: &RunUnit<I, O>, input: I)
where
    I: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    let outcome = AssertUnwindSafe(unit.instance.execute(input))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(TaskError::from_panic(panic)));

    unit.clean_up_once(shared.config().cleanup_timeout(), shared.task_type().name())
        .await;

    shared.settle(unit.epoch, outcome).await;
}
