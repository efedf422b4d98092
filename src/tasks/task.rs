//! # Task capabilities.
//!
//! A unit of work implements [`Task`] to be run by a [`TaskHandle`](crate::TaskHandle),
//! and optionally [`SuspendableTask`] to support cooperative pause/continue.
//!
//! The handle never inspects concrete task types. Factories wrap each instance in
//! [`TaskInstance`], a closed set of capability variants, and the handle probes it
//! with [`TaskInstance::as_suspendable`] once per suspend/resume call.
//!
//! All capability methods take `&self`: `execute` runs on a worker while
//! `try_suspend`/`try_resume` are called from the controlling side, so instances
//! keep their mutable state behind atomics or locks.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;

/// # Runnable unit of work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use taskhandle::{Task, TaskError};
///
/// struct Double;
///
/// #[async_trait]
/// impl Task<u32, u32> for Double {
///     async fn execute(&self, input: u32) -> Result<u32, TaskError> {
///         input.checked_mul(2).ok_or_else(|| TaskError::fail("overflow"))
///     }
/// }
/// ```
#[async_trait]
pub trait Task<I, O>: Send + Sync + 'static {
    /// Runs the work to completion.
    ///
    /// Failures are reported by returning `Err`; the handle stores the error verbatim.
    async fn execute(&self, input: I) -> Result<O, TaskError>;

    /// Releases resources held by the instance.
    ///
    /// Called exactly once after execution ends, whether it completed, failed or was killed.
    /// An error here is logged and never replaces the outcome of [`execute`](Task::execute).
    async fn clean_up(&self) -> Result<(), TaskError> {
        Ok(())
    }
}

/// # Task that supports cooperative suspension.
///
/// Returning `false` from either hook means the operation is not currently possible;
/// the handle then leaves its state unchanged.
#[async_trait]
pub trait SuspendableTask<I, O>: Task<I, O> {
    /// Asks the running task to pause.
    async fn try_suspend(&self) -> bool;

    /// Asks the paused task to continue.
    async fn try_resume(&self) -> bool;
}

/// A task instance tagged with its capability level.
pub enum TaskInstance<I, O> {
    /// Task that can only run to completion.
    Plain(Arc<dyn Task<I, O>>),
    /// Task that can additionally be suspended and resumed.
    Suspendable(Arc<dyn SuspendableTask<I, O>>),
}

impl<I, O> TaskInstance<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Wraps a plain task.
    pub fn plain<T: Task<I, O>>(task: T) -> Self {
        TaskInstance::Plain(Arc::new(task))
    }

    /// Wraps a suspendable task.
    pub fn suspendable<T: SuspendableTask<I, O>>(task: T) -> Self {
        TaskInstance::Suspendable(Arc::new(task))
    }

    /// Returns the suspension capability, if this instance has it.
    pub fn as_suspendable(&self) -> Option<&Arc<dyn SuspendableTask<I, O>>> {
        match self {
            TaskInstance::Plain(_) => None,
            TaskInstance::Suspendable(task) => Some(task),
        }
    }

    /// True if [`as_suspendable`](Self::as_suspendable) would return `Some`.
    pub fn is_suspendable(&self) -> bool {
        self.as_suspendable().is_some()
    }

    pub(crate) async fn execute(&self, input: I) -> Result<O, TaskError> {
        match self {
            TaskInstance::Plain(task) => task.execute(input).await,
            TaskInstance::Suspendable(task) => task.execute(input).await,
        }
    }

    pub(crate) async fn clean_up(&self) -> Result<(), TaskError> {
        match self {
            TaskInstance::Plain(task) => task.clean_up().await,
            TaskInstance::Suspendable(task) => task.clean_up().await,
        }
    }
}

impl<I, O> Clone for TaskInstance<I, O> {
    fn clone(&self) -> Self {
        match self {
            TaskInstance::Plain(task) => TaskInstance::Plain(Arc::clone(task)),
            TaskInstance::Suspendable(task) => TaskInstance::Suspendable(Arc::clone(task)),
        }
    }
}

impl<I, O> std::fmt::Debug for TaskInstance<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskInstance::Plain(_) => f.write_str("TaskInstance::Plain"),
            TaskInstance::Suspendable(_) => f.write_str("TaskInstance::Suspendable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Echo;

    #[async_trait]
    impl Task<String, String> for Echo {
        async fn execute(&self, input: String) -> Result<String, TaskError> {
            Ok(input)
        }
    }

    #[derive(Default)]
    struct Pausable {
        paused: AtomicBool,
    }

    #[async_trait]
    impl Task<String, String> for Pausable {
        async fn execute(&self, input: String) -> Result<String, TaskError> {
            Ok(input.to_uppercase())
        }

        async fn clean_up(&self) -> Result<(), TaskError> {
            Err(TaskError::clean_up("nothing to release"))
        }
    }

    #[async_trait]
    impl SuspendableTask<String, String> for Pausable {
        async fn try_suspend(&self) -> bool {
            !self.paused.swap(true, Ordering::SeqCst)
        }

        async fn try_resume(&self) -> bool {
            self.paused.swap(false, Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn plain_instance_has_no_suspension_capability() {
        let instance = TaskInstance::plain(Echo);
        assert!(!instance.is_suspendable());
        assert_eq!(instance.execute("hi".into()).await.unwrap(), "hi");
        assert!(instance.clean_up().await.is_ok());
    }

    #[tokio::test]
    async fn suspendable_instance_dispatches_to_its_task() {
        let instance = TaskInstance::suspendable(Pausable::default());
        let caps = instance.as_suspendable().unwrap();

        assert!(caps.try_suspend().await);
        assert!(!caps.try_suspend().await);
        assert!(caps.try_resume().await);

        assert_eq!(instance.execute("hi".into()).await.unwrap(), "HI");
        assert_eq!(
            instance.clean_up().await,
            Err(TaskError::clean_up("nothing to release"))
        );
    }
}
