//! # Execution unit: one run of one task instance.
//!
//! A handle owns at most one [`Execution`] at a time. It bundles:
//! - the [`TaskInstance`] created for this run,
//! - the [`CancellationToken`] the spawned future races against,
//! - the tokio [`JoinHandle`] used to await or abort it,
//! - the epoch that identifies the run, so late completions of a replaced run are discarded,
//! - a once-flag guaranteeing `clean_up` is invoked exactly once.
//!
//! ## Ownership
//! ```text
//! TaskHandle ──slot──► Execution { unit: Arc<RunUnit>, join }
//!                                       │
//!     runner::run_once (spawned) ◄──────┘ (shares the unit, not the join handle)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::TaskInstance;

/// State shared between the handle and the spawned execution future.
pub(super) struct RunUnit<I, O> {
    /// Identifies this run within its handle.
    pub epoch: u64,
    /// Instance created by the factory for this run.
    pub instance: TaskInstance<I, O>,
    /// Cancelled by `kill`/`dispose`.
    pub token: CancellationToken,
    cleaned: AtomicBool,
}

impl<I, O> RunUnit<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    pub fn new(epoch: u64, instance: TaskInstance<I, O>) -> Self {
        Self {
            epoch,
            instance,
            token: CancellationToken::new(),
            cleaned: AtomicBool::new(false),
        }
    }

    /// Invokes `clean_up` unless an earlier caller already did.
    ///
    /// Failures (including hitting `timeout`) are logged and swallowed.
    pub async fn clean_up_once(&self, timeout: Option<Duration>, task: &str) {
        if self.cleaned.swap(true, Ordering::AcqRel) {
            return;
        }

        let res = match timeout {
            Some(dur) => match time::timeout(dur, self.instance.clean_up()).await {
                Ok(res) => res,
                Err(_elapsed) => Err(TaskError::clean_up(format!("timed out after {dur:?}"))),
            },
            None => self.instance.clean_up().await,
        };

        if let Err(err) = res {
            tracing::warn!(
                task,
                epoch = self.epoch,
                error = %err,
                label = err.as_label(),
                "cleanup failed; outcome unchanged"
            );
        }
    }
}

/// The live execution of a handle.
pub(super) struct Execution<I, O> {
    pub unit: Arc<RunUnit<I, O>>,
    pub join: JoinHandle<()>,
}

impl<I, O> Execution<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Cancels the execution and waits up to `grace` for it to stop, then cleans up.
    ///
    /// If the future does not acknowledge cancellation in time it is aborted and
    /// detached; the wait is never unbounded.
    pub async fn terminate(self, grace: Duration, cleanup_timeout: Option<Duration>, task: &str) {
        let Execution { unit, mut join } = self;
        unit.token.cancel();

        if time::timeout(grace, &mut join).await.is_err() {
            tracing::warn!(
                task,
                epoch = unit.epoch,
                grace = ?grace,
                "execution did not stop within grace; aborting"
            );
            join.abort();
        }

        unit.clean_up_once(cleanup_timeout, task).await;
    }
}
