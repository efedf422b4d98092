use std::sync::Arc;

use tokio::runtime::Handle;

use super::config::HandleConfig;
use super::handle::{RunCondition, TaskHandle};
use crate::subscribers::Subscribe;
use crate::tasks::{TaskFactory, TaskType};

/// Builder for constructing a [`TaskHandle`] with optional settings.
///
/// Defaults: `ordinal = 0`, `cost = 0`, a run condition that always holds,
/// [`HandleConfig::default`], no subscribers.
pub struct HandleBuilder<I, O> {
    factory: Arc<dyn TaskFactory<I, O>>,
    runtime: Handle,
    task_type: TaskType,
    input: I,
    ordinal: u64,
    cost: u64,
    run_condition: RunCondition,
    config: HandleConfig,
    subscribers: Vec<Arc<dyn Subscribe<O>>>,
}

impl<I, O> HandleBuilder<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    /// Creates a builder with the required collaborators.
    pub fn new(
        factory: Arc<dyn TaskFactory<I, O>>,
        runtime: Handle,
        task_type: TaskType,
        input: I,
    ) -> Self {
        Self {
            factory,
            runtime,
            task_type,
            input,
            ordinal: 0,
            cost: 0,
            run_condition: Arc::new(|| true),
            config: HandleConfig::default(),
            subscribers: Vec::new(),
        }
    }

    /// Sets the opaque ordinal kept for the owning orchestrator.
    pub fn ordinal(mut self, ordinal: u64) -> Self {
        self.ordinal = ordinal;
        self
    }

    /// Sets the opaque scheduling weight.
    pub fn cost(mut self, cost: u64) -> Self {
        self.cost = cost;
        self
    }

    /// Sets the predicate evaluated once per `run()` call.
    pub fn run_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.run_condition = Arc::new(condition);
        self
    }

    /// Replaces the handle configuration.
    pub fn config(mut self, config: HandleConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets subscribers that receive every event from construction on.
    ///
    /// Each subscriber gets a dedicated worker with a bounded queue.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe<O>>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the handle in the `Waiting` state and starts subscriber workers.
    pub fn build(self) -> TaskHandle<I, O> {
        let handle = TaskHandle::from_parts(
            self.factory,
            self.runtime,
            self.task_type,
            self.input,
            self.ordinal,
            self.run_condition,
            self.cost,
            self.config,
        );
        handle.attach_all(self.subscribers);
        handle
    }
}
