//! # TaskHandle: per-task lifecycle state machine.
//!
//! A [`TaskHandle`] wraps one unit of work and drives it through
//! `Waiting → Running → Suspended / Complete / Failed / Killed`, publishing every
//! transition on its event bus.
//!
//! ## Architecture
//! ```text
//! caller ──► run/suspend/resume/kill/reset/dispose
//!               │
//!               ▼
//!        transition lock (tokio Mutex<Slot>) ──► factory.create() (run only)
//!               │                                      │
//!               │                    runtime.spawn(runner::run_once) ── execute ── clean_up
//!               │                                                                     │
//!               ├──► status (std RwLock: state/output/error) ◄──── settle(epoch) ◄───┘
//!               └──► Bus::publish (StateChanged, Completed, Failed)
//! ```
//!
//! ## Rules
//! - Every transition happens under the transition lock; events are published there too,
//!   so subscribers observe transitions in order.
//! - `status` is only written under the transition lock and read without awaiting.
//! - At most one [`Execution`] exists per handle; it is present iff the state is live.
//! - Task failures are captured into state and events, never returned to control callers.
//! - `kill`/`dispose` cancel the live run's token before waiting for the lock, and
//!   `try_suspend`/`try_resume` race that token, so a hung capability call cannot block them.

use std::sync::{Arc, RwLock};

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::core::actor::{Execution, RunUnit};
use crate::core::builder::HandleBuilder;
use crate::core::config::HandleConfig;
use crate::core::runner;
use crate::core::state::{ResumeResult, SuspendResult, TaskState};
use crate::error::{HandleError, TaskError};
use crate::events::{self, Bus, EventKind, EventStream, HandleEvent, OnceEvent};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::{TaskFactory, TaskType};

/// Predicate gating whether `run()` may start an execution.
pub type RunCondition = Arc<dyn Fn() -> bool + Send + Sync>;

/// Observable status, written only under the transition lock.
struct Status<O> {
    state: TaskState,
    output: Option<O>,
    error: Option<TaskError>,
}

/// Mutable part guarded by the transition lock.
struct Slot<I, O> {
    execution: Option<Execution<I, O>>,
    epoch: u64,
    disposed: bool,
}

/// State shared between the handle and its spawned executions.
pub(crate) struct Shared<I, O> {
    factory: Arc<dyn TaskFactory<I, O>>,
    runtime: Handle,
    task_type: TaskType,
    input: I,
    ordinal: u64,
    cost: u64,
    run_condition: RunCondition,
    config: HandleConfig,
    slot: Mutex<Slot<I, O>>,
    status: RwLock<Status<O>>,
    /// Token of the most recent run, reachable without the transition lock.
    live_token: std::sync::Mutex<Option<CancellationToken>>,
    bus: Bus<O>,
}

/// Handle owning the lifecycle of a single task.
///
/// Control operations are `async` and may be called concurrently from any number of tasks;
/// they are serialized internally. Share a handle across tasks with `Arc<TaskHandle<_, _>>`.
///
/// # Example
/// ```rust
/// use async_trait::async_trait;
/// use taskhandle::{EventKind, FactoryFn, Task, TaskError, TaskHandle, TaskInstance, TaskState, TaskType};
///
/// struct Add;
///
/// #[async_trait]
/// impl Task<(u32, u32), u32> for Add {
///     async fn execute(&self, (a, b): (u32, u32)) -> Result<u32, TaskError> {
///         Ok(a + b)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let factory = FactoryFn::arc(|_ty: TaskType, _input: (u32, u32)| async move {
///         Ok(TaskInstance::<(u32, u32), u32>::plain(Add))
///     });
///     let handle = TaskHandle::builder(factory, tokio::runtime::Handle::current(), TaskType::of::<Add>(), (2, 3))
///         .build();
///
///     let done = handle.once(EventKind::Completed);
///     handle.run().await;
///     done.await;
///
///     assert_eq!(handle.state(), TaskState::Complete);
///     assert_eq!(handle.output(), Ok(5));
///     handle.dispose().await;
/// }
/// ```
pub struct TaskHandle<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    shared: Arc<Shared<I, O>>,
}

impl<I, O> TaskHandle<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    /// Creates a handle in the `Waiting` state with default configuration.
    ///
    /// ### Parameters
    /// - `factory`: builds a fresh instance on every start from `Waiting` or `Killed`
    /// - `runtime`: execution context the task runs on
    /// - `task_type`: descriptor passed to the factory
    /// - `input`: value handed to every execution
    /// - `ordinal`: opaque number kept for the owning orchestrator
    /// - `run_condition`: evaluated once per `run()` call
    /// - `cost`: opaque scheduling weight kept for the owning orchestrator
    pub fn new(
        factory: Arc<dyn TaskFactory<I, O>>,
        runtime: Handle,
        task_type: TaskType,
        input: I,
        ordinal: u64,
        run_condition: RunCondition,
        cost: u64,
    ) -> Self {
        Self::from_parts(
            factory,
            runtime,
            task_type,
            input,
            ordinal,
            run_condition,
            cost,
            HandleConfig::default(),
        )
    }

    /// Starts a [`HandleBuilder`] for optional settings (config, subscribers, cost...).
    pub fn builder(
        factory: Arc<dyn TaskFactory<I, O>>,
        runtime: Handle,
        task_type: TaskType,
        input: I,
    ) -> HandleBuilder<I, O> {
        HandleBuilder::new(factory, runtime, task_type, input)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        factory: Arc<dyn TaskFactory<I, O>>,
        runtime: Handle,
        task_type: TaskType,
        input: I,
        ordinal: u64,
        run_condition: RunCondition,
        cost: u64,
        config: HandleConfig,
    ) -> Self {
        let bus = Bus::new(config.bus_capacity_clamped(), task_type.name());
        Self {
            shared: Arc::new(Shared {
                factory,
                runtime,
                task_type,
                input,
                ordinal,
                cost,
                run_condition,
                config,
                slot: Mutex::new(Slot {
                    execution: None,
                    epoch: 0,
                    disposed: false,
                }),
                status: RwLock::new(Status {
                    state: TaskState::Waiting,
                    output: None,
                    error: None,
                }),
                live_token: std::sync::Mutex::new(None),
                bus,
            }),
        }
    }

    /// Starts an execution if the handle is `Waiting` or `Killed` and the run condition holds.
    ///
    /// Returns once the transition is decided; never waits for `execute` to finish.
    /// In any other state this is a no-op.
    pub async fn run(&self) {
        let shared = &self.shared;
        let mut slot = shared.slot.lock().await;
        if slot.disposed {
            tracing::debug!(task = %shared.task_type, "run ignored: handle disposed");
            return;
        }

        let state = shared.state();
        if !matches!(state, TaskState::Waiting | TaskState::Killed) {
            tracing::trace!(task = %shared.task_type, %state, "run ignored");
            return;
        }
        if !(shared.run_condition)() {
            tracing::debug!(task = %shared.task_type, %state, "run condition not met");
            return;
        }

        let instance = match shared.factory.create(&shared.task_type, &shared.input).await {
            Ok(instance) => instance,
            Err(err) => {
                let err = if err.is_construction() {
                    err
                } else {
                    TaskError::Construction {
                        task_type: shared.task_type.name().to_string(),
                        error: err.as_message().to_string(),
                    }
                };
                shared.settle_failed(err);
                return;
            }
        };

        slot.epoch += 1;
        let unit = Arc::new(RunUnit::new(slot.epoch, instance));
        *shared.live_token() = Some(unit.token.clone());
        shared.transition(TaskState::Running);

        let join = shared.runtime.spawn(runner::run_once(
            Arc::clone(shared),
            Arc::clone(&unit),
            shared.input.clone(),
        ));
        slot.execution = Some(Execution { unit, join });
    }

    /// Asks a running, suspendable task to pause.
    ///
    /// Returns once the task answered and the transition (if any) was applied.
    pub async fn suspend(&self) -> SuspendResult {
        let shared = &self.shared;
        let slot = shared.slot.lock().await;
        if shared.state() != TaskState::Running {
            return SuspendResult::Failed;
        }
        let Some((task, token)) = slot.execution.as_ref().and_then(|exec| {
            exec.unit
                .instance
                .as_suspendable()
                .map(|task| (task, &exec.unit.token))
        }) else {
            tracing::debug!(task = %shared.task_type, "suspend refused: task is not suspendable");
            return SuspendResult::Failed;
        };

        let accepted = tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(task = %shared.task_type, "suspend abandoned: run cancelled");
                false
            }
            accepted = task.try_suspend() => accepted,
        };
        if !accepted {
            tracing::debug!(task = %shared.task_type, "suspend refused by task");
            return SuspendResult::Failed;
        }
        shared.transition(TaskState::Suspended);
        SuspendResult::Suspended
    }

    /// Asks a suspended task to continue.
    ///
    /// Returns once the task answered and the transition (if any) was applied.
    pub async fn resume(&self) -> ResumeResult {
        let shared = &self.shared;
        let slot = shared.slot.lock().await;
        if shared.state() != TaskState::Suspended {
            return ResumeResult::Failed;
        }
        let Some((task, token)) = slot.execution.as_ref().and_then(|exec| {
            exec.unit
                .instance
                .as_suspendable()
                .map(|task| (task, &exec.unit.token))
        }) else {
            return ResumeResult::Failed;
        };

        let accepted = tokio::select! {
            biased;
            _ = token.cancelled() => false,
            accepted = task.try_resume() => accepted,
        };
        if !accepted {
            tracing::debug!(task = %shared.task_type, "resume refused by task");
            return ResumeResult::Failed;
        }
        shared.transition(TaskState::Running);
        ResumeResult::Resumed
    }

    /// Forcibly terminates a running or suspended execution.
    ///
    /// Returns once the execution unit stopped (or was aborted after
    /// [`HandleConfig::kill_grace`]) and cleanup was attempted. No-op in other states.
    pub async fn kill(&self) {
        let shared = &self.shared;
        shared.cancel_live();
        let mut slot = shared.slot.lock().await;
        let Some(exec) = slot.execution.take() else {
            tracing::trace!(task = %shared.task_type, state = %shared.state(), "kill ignored");
            return;
        };
        shared.terminate(exec).await;
        shared.transition(TaskState::Killed);
    }

    /// Returns a `Complete`, `Failed` or `Killed` handle to `Waiting`, clearing its result.
    ///
    /// Returns `false` (and changes nothing) in any other state or after disposal.
    pub async fn reset(&self) -> bool {
        let shared = &self.shared;
        let slot = shared.slot.lock().await;
        if slot.disposed || !shared.state().is_terminal() {
            return false;
        }
        shared.transition(TaskState::Waiting);
        true
    }

    /// Releases everything the handle holds, regardless of state.
    ///
    /// A live execution is killed (publishing `StateChanged(Killed)`), then the event
    /// channel is closed: streams end and pending one-shot subscriptions resolve to `None`.
    /// Later `run()` calls are ignored.
    pub async fn dispose(&self) {
        let shared = &self.shared;
        shared.cancel_live();
        let mut slot = shared.slot.lock().await;
        if slot.disposed {
            return;
        }
        slot.disposed = true;
        if let Some(exec) = slot.execution.take() {
            shared.terminate(exec).await;
            shared.transition(TaskState::Killed);
        }
        let receivers = shared.bus.receiver_count();
        shared.bus.close();
        tracing::debug!(task = %shared.task_type, receivers, "handle disposed");
    }

    /// Current state.
    pub fn state(&self) -> TaskState {
        self.shared.state()
    }

    /// Output of the last execution.
    ///
    /// # Errors
    /// [`HandleError::InvalidState`] unless the state is `Complete`.
    pub fn output(&self) -> Result<O, HandleError> {
        let status = self.shared.read_status();
        match (status.state, &status.output) {
            (TaskState::Complete, Some(output)) => Ok(output.clone()),
            (actual, _) => Err(HandleError::InvalidState {
                expected: TaskState::Complete,
                actual,
            }),
        }
    }

    /// Error of the last construction or execution.
    ///
    /// # Errors
    /// [`HandleError::InvalidState`] unless the state is `Failed`.
    pub fn error(&self) -> Result<TaskError, HandleError> {
        let status = self.shared.read_status();
        match (status.state, &status.error) {
            (TaskState::Failed, Some(err)) => Ok(err.clone()),
            (actual, _) => Err(HandleError::InvalidState {
                expected: TaskState::Failed,
                actual,
            }),
        }
    }

    /// Opaque scheduling weight.
    pub fn cost(&self) -> u64 {
        self.shared.cost
    }

    /// Opaque number supplied at construction.
    pub fn ordinal(&self) -> u64 {
        self.shared.ordinal
    }

    /// Input handed to every execution.
    pub fn input(&self) -> &I {
        &self.shared.input
    }

    /// Descriptor passed to the factory.
    pub fn task_type(&self) -> &TaskType {
        &self.shared.task_type
    }

    /// Configuration in effect.
    pub fn config(&self) -> &HandleConfig {
        &self.shared.config
    }

    /// True once [`dispose`](Self::dispose) ran.
    pub fn is_disposed(&self) -> bool {
        self.shared.bus.is_closed()
    }

    /// Streams every future event of `kind`, in transition order, until the handle is disposed.
    pub fn on_any(&self, kind: EventKind) -> EventStream<O> {
        events::stream(self.shared.bus.subscribe(), kind)
    }

    /// Resolves with the next event of `kind` (`None` if the handle is disposed first).
    ///
    /// The subscription is registered by this call, before the future is polled.
    pub fn once(&self, kind: EventKind) -> OnceEvent<O> {
        events::once(self.shared.bus.subscribe(), kind)
    }

    /// Feeds all future events to `subscriber` through its own bounded queue.
    ///
    /// The subscriber worker stops after the handle is disposed.
    pub fn attach(&self, subscriber: Arc<dyn Subscribe<O>>) {
        self.attach_all(vec![subscriber]);
    }

    pub(crate) fn attach_all(&self, subscribers: Vec<Arc<dyn Subscribe<O>>>) {
        if subscribers.is_empty() {
            return;
        }
        let set = SubscriberSet::new(subscribers, &self.shared.runtime);
        set.listen(self.shared.bus.subscribe(), &self.shared.runtime);
    }
}

impl<I, O> Drop for TaskHandle<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    /// Cancels a live execution and finishes its cleanup in the background.
    fn drop(&mut self) {
        let shared = Arc::clone(&self.shared);
        let exec = match shared.slot.try_lock() {
            Ok(mut slot) => {
                slot.disposed = true;
                slot.execution.take()
            }
            // Only a finishing run's `settle` can hold the lock here; it clears the execution itself.
            Err(_) => None,
        };
        shared.bus.close();

        if let Some(exec) = exec {
            let runtime = shared.runtime.clone();
            runtime.spawn(async move {
                shared.terminate(exec).await;
            });
        }
    }
}

impl<I, O> std::fmt::Debug for TaskHandle<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("task_type", &self.shared.task_type)
            .field("state", &self.shared.state())
            .field("ordinal", &self.shared.ordinal)
            .field("cost", &self.shared.cost)
            .finish()
    }
}

impl<I, O> Shared<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    pub(crate) fn task_type(&self) -> &TaskType {
        &self.task_type
    }

    pub(crate) fn config(&self) -> &HandleConfig {
        &self.config
    }

    fn read_status(&self) -> std::sync::RwLockReadGuard<'_, Status<O>> {
        self.status.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_status(&self) -> std::sync::RwLockWriteGuard<'_, Status<O>> {
        self.status.write().unwrap_or_else(|e| e.into_inner())
    }

    fn state(&self) -> TaskState {
        self.read_status().state
    }

    fn live_token(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.live_token.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Cancels the most recent run, if any. A finished run ignores it.
    fn cancel_live(&self) {
        if let Some(token) = self.live_token().as_ref() {
            token.cancel();
        }
    }

    /// Moves to a non-terminal-result state and publishes it. Caller holds the transition lock.
    fn transition(&self, next: TaskState) {
        let prev = {
            let mut status = self.write_status();
            let prev = status.state;
            status.state = next;
            status.output = None;
            status.error = None;
            prev
        };
        tracing::debug!(task = %self.task_type, from = %prev, to = %next, "state changed");
        self.bus.publish(HandleEvent::StateChanged(next));
    }

    /// Records an output. Caller holds the transition lock.
    fn settle_complete(&self, output: O) {
        {
            let mut status = self.write_status();
            status.state = TaskState::Complete;
            status.output = Some(output.clone());
            status.error = None;
        }
        tracing::debug!(task = %self.task_type, to = %TaskState::Complete, "state changed");
        self.bus.publish(HandleEvent::StateChanged(TaskState::Complete));
        self.bus.publish(HandleEvent::Completed(output));
    }

    /// Records a failure. Caller holds the transition lock.
    fn settle_failed(&self, err: TaskError) {
        {
            let mut status = self.write_status();
            status.state = TaskState::Failed;
            status.output = None;
            status.error = Some(err.clone());
        }
        tracing::debug!(
            task = %self.task_type,
            to = %TaskState::Failed,
            error = %err,
            label = err.as_label(),
            "state changed"
        );
        self.bus.publish(HandleEvent::StateChanged(TaskState::Failed));
        self.bus.publish(HandleEvent::Failed(err));
    }

    /// Applies the outcome of the execution identified by `epoch`.
    ///
    /// Called from the spawned execution; outcomes of replaced executions are discarded.
    pub(crate) async fn settle(&self, epoch: u64, outcome: Result<O, TaskError>) {
        let mut slot = self.slot.lock().await;
        match slot.execution.as_ref() {
            Some(exec) if exec.unit.epoch == epoch => {}
            _ => {
                tracing::debug!(task = %self.task_type, epoch, "stale outcome discarded");
                return;
            }
        }
        // Dropping the join handle here detaches the (finishing) tokio task itself.
        slot.execution = None;
        match outcome {
            Ok(output) => self.settle_complete(output),
            Err(err) => self.settle_failed(err),
        }
    }

    async fn terminate(&self, exec: Execution<I, O>) {
        exec.terminate(
            self.config.kill_grace,
            self.config.cleanup_timeout(),
            self.task_type.name(),
        )
        .await;
    }
}
