//! Shared mocks and helpers for handle integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use taskhandle::{
    EventKind, HandleConfig, SuspendableTask, Task, TaskError, TaskFactory, TaskHandle,
    TaskInstance, TaskState, TaskType,
};

pub const RANDOM_FAILURE: &str = "This is a random failure";

/// Behavior switches for [`MockTask`] and [`MockSuspendableTask`].
#[derive(Debug, Clone)]
pub struct MockInput {
    pub suspendable: bool,
    pub fail_to_suspend: bool,
    pub fail_to_resume: bool,
    /// `try_suspend` never answers.
    pub hang_on_suspend: bool,
    pub fail_while_running: bool,
    pub fail_during_clean_up: bool,
    pub fail_construction: bool,
    /// Blocks the worker thread instead of yielding (ignores cancellation).
    pub unresponsive: bool,
    pub steps: usize,
    pub step: Duration,
    pub cost: u64,
}

impl Default for MockInput {
    fn default() -> Self {
        Self {
            suspendable: false,
            fail_to_suspend: false,
            fail_to_resume: false,
            hang_on_suspend: false,
            fail_while_running: false,
            fail_during_clean_up: false,
            fail_construction: false,
            unresponsive: false,
            steps: 10,
            step: Duration::from_millis(20),
            cost: 0,
        }
    }
}

impl MockInput {
    pub fn suspendable() -> Self {
        Self {
            suspendable: true,
            ..Self::default()
        }
    }

    pub fn task_type(&self) -> TaskType {
        if self.suspendable {
            TaskType::of::<MockSuspendableTask>()
        } else {
            TaskType::of::<MockTask>()
        }
    }
}

/// Counters shared by every instance a [`MockFactory`] creates.
#[derive(Debug, Default)]
pub struct Counters {
    pub created: AtomicUsize,
    pub executed: AtomicUsize,
    pub cleaned: AtomicUsize,
}

impl Counters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }

    pub fn cleaned(&self) -> usize {
        self.cleaned.load(Ordering::SeqCst)
    }
}

/// Runs `steps` sleeps of `step` each and returns the number of steps done.
pub struct MockTask {
    counters: Arc<Counters>,
    paused: AtomicBool,
    wake: Notify,
}

impl MockTask {
    fn new(counters: Arc<Counters>) -> Self {
        Self {
            counters,
            paused: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }

    async fn work(&self, input: &MockInput) -> Result<usize, TaskError> {
        self.counters.executed.fetch_add(1, Ordering::SeqCst);

        if input.unresponsive {
            std::thread::sleep(input.step * input.steps as u32);
            return Ok(input.steps);
        }

        for done in 0..input.steps {
            while self.paused.load(Ordering::SeqCst) {
                let notified = self.wake.notified();
                if !self.paused.load(Ordering::SeqCst) {
                    break;
                }
                notified.await;
            }
            if input.fail_while_running && done == input.steps / 2 {
                return Err(TaskError::fail(RANDOM_FAILURE));
            }
            tokio::time::sleep(input.step).await;
        }
        Ok(input.steps)
    }

    fn release(&self, input: &MockInput) -> Result<(), TaskError> {
        self.counters.cleaned.fetch_add(1, Ordering::SeqCst);
        if input.fail_during_clean_up {
            return Err(TaskError::clean_up("cleanup exploded"));
        }
        Ok(())
    }
}

/// Input-aware wrapper kept by the task so cleanup knows which switches apply.
pub struct MockPlain {
    inner: MockTask,
    input: MockInput,
}

#[async_trait]
impl Task<MockInput, usize> for MockPlain {
    async fn execute(&self, input: MockInput) -> Result<usize, TaskError> {
        self.inner.work(&input).await
    }

    async fn clean_up(&self) -> Result<(), TaskError> {
        self.inner.release(&self.input)
    }
}

/// [`MockTask`] that also honors suspend/resume.
pub struct MockSuspendableTask {
    inner: MockTask,
    input: MockInput,
}

#[async_trait]
impl Task<MockInput, usize> for MockSuspendableTask {
    async fn execute(&self, input: MockInput) -> Result<usize, TaskError> {
        self.inner.work(&input).await
    }

    async fn clean_up(&self) -> Result<(), TaskError> {
        self.inner.release(&self.input)
    }
}

#[async_trait]
impl SuspendableTask<MockInput, usize> for MockSuspendableTask {
    async fn try_suspend(&self) -> bool {
        if self.input.hang_on_suspend {
            futures::future::pending::<()>().await;
        }
        if self.input.fail_to_suspend {
            return false;
        }
        self.inner.paused.store(true, Ordering::SeqCst);
        true
    }

    async fn try_resume(&self) -> bool {
        if self.input.fail_to_resume {
            return false;
        }
        self.inner.paused.store(false, Ordering::SeqCst);
        self.inner.wake.notify_waiters();
        true
    }
}

/// Factory producing mocks according to [`MockInput`].
#[derive(Default)]
pub struct MockFactory {
    pub counters: Arc<Counters>,
}

#[async_trait]
impl TaskFactory<MockInput, usize> for MockFactory {
    async fn create(
        &self,
        task_type: &TaskType,
        input: &MockInput,
    ) -> Result<TaskInstance<MockInput, usize>, TaskError> {
        if input.fail_construction {
            return Err(TaskError::Construction {
                task_type: task_type.name().to_string(),
                error: "no such task".into(),
            });
        }
        self.counters.created.fetch_add(1, Ordering::SeqCst);

        let inner = MockTask::new(Arc::clone(&self.counters));
        let input = input.clone();
        if input.suspendable {
            Ok(TaskInstance::suspendable(MockSuspendableTask { inner, input }))
        } else {
            Ok(TaskInstance::plain(MockPlain { inner, input }))
        }
    }
}

/// Builds a handle for `input` on the current runtime.
pub fn handle(factory: &Arc<MockFactory>, input: MockInput) -> TaskHandle<MockInput, usize> {
    handle_with(factory, input, HandleConfig::default())
}

pub fn handle_with(
    factory: &Arc<MockFactory>,
    input: MockInput,
    config: HandleConfig,
) -> TaskHandle<MockInput, usize> {
    let task_type = input.task_type();
    let cost = input.cost;
    TaskHandle::builder(
        factory.clone(),
        tokio::runtime::Handle::current(),
        task_type,
        input,
    )
    .cost(cost)
    .config(config)
    .build()
}

/// Collects every state change until the handle is disposed.
pub fn record(handle: &TaskHandle<MockInput, usize>) -> JoinHandle<Vec<TaskState>> {
    let stream = handle.on_any(EventKind::StateChanged);
    tokio::spawn(async move { stream.filter_map(|ev| async move { ev.state() }).collect().await })
}

pub async fn pause(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

/// Installs a test subscriber honoring `RUST_LOG`; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
