//! # Task capabilities and factories.
//!
//! This module provides the contract between a handle and the work it runs:
//! - [`Task`] - async unit of work with best-effort cleanup
//! - [`SuspendableTask`] - task that can additionally pause and continue
//! - [`TaskInstance`] - an instance tagged with its capability level
//! - [`TaskFactory`] / [`TaskType`] - how handles obtain fresh instances
//! - [`FactoryFn`] - closure-backed factory

mod factory;
mod factory_fn;
mod task;

pub use factory::{TaskFactory, TaskType};
pub use factory_fn::FactoryFn;
pub use task::{SuspendableTask, Task, TaskInstance};
