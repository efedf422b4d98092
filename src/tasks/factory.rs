//! # Task factory contract.
//!
//! A [`TaskHandle`](crate::TaskHandle) never constructs tasks itself. Each time it
//! (re)starts from a non-live state it asks its [`TaskFactory`] for a fresh
//! [`TaskInstance`] of the configured [`TaskType`].
//!
//! How instances are built (lookup tables, dependency injection, pooling) is up to
//! the factory. Construction errors surface as a `Failed` transition on the handle.

use std::borrow::Cow;
use std::fmt;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::task::TaskInstance;

/// Descriptor of the kind of task a handle runs.
///
/// Cheap to clone; the factory decides what the name means.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskType(Cow<'static, str>);

impl TaskType {
    /// Creates a descriptor from an arbitrary name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Creates a descriptor named after the Rust type `T`.
    ///
    /// ## Example
    /// ```rust
    /// use taskhandle::TaskType;
    ///
    /// struct Sleeper;
    /// let ty = TaskType::of::<Sleeper>();
    /// assert!(ty.name().ends_with("Sleeper"));
    /// ```
    pub fn of<T: ?Sized>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// Returns the descriptor name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces task instances for handles.
///
/// The factory is shared by every handle it serves, so `create` takes `&self`.
#[async_trait]
pub trait TaskFactory<I, O>: Send + Sync + 'static {
    /// Builds a fresh instance of `task_type` for `input`.
    ///
    /// Return [`TaskError::Construction`] (or any other [`TaskError`]) to fail the run.
    async fn create(&self, task_type: &TaskType, input: &I)
    -> Result<TaskInstance<I, O>, TaskError>;
}
