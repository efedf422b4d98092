//! # Function-backed factory (`FactoryFn`)
//!
//! [`FactoryFn`] wraps a closure `F: Fn(TaskType, I) -> Fut`, producing a fresh
//! future (and therefore a fresh instance) per call. The closure receives owned
//! clones of the descriptor and input so the returned future can be `'static`.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use taskhandle::{FactoryFn, Task, TaskError, TaskInstance, TaskType};
//!
//! struct Greet;
//!
//! #[async_trait]
//! impl Task<String, String> for Greet {
//!     async fn execute(&self, name: String) -> Result<String, TaskError> {
//!         Ok(format!("hello {name}"))
//!     }
//! }
//!
//! let factory = FactoryFn::arc(|_ty: TaskType, _input: String| async move {
//!     Ok(TaskInstance::<String, String>::plain(Greet))
//! });
//! # let _ = factory;
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::factory::{TaskFactory, TaskType};
use crate::tasks::task::TaskInstance;

/// Closure-backed [`TaskFactory`].
pub struct FactoryFn<F, I, O> {
    f: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<F, Fut, I, O> FactoryFn<F, I, O>
where
    F: Fn(TaskType, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<TaskInstance<I, O>, TaskError>> + Send + 'static,
{
    /// Creates a new closure-backed factory.
    ///
    /// Prefer [`FactoryFn::arc`] when you immediately need a shared factory.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }

    /// Creates the factory and returns it behind an `Arc`.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut, I, O> TaskFactory<I, O> for FactoryFn<F, I, O>
where
    F: Fn(TaskType, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<TaskInstance<I, O>, TaskError>> + Send + 'static,
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    async fn create(
        &self,
        task_type: &TaskType,
        input: &I,
    ) -> Result<TaskInstance<I, O>, TaskError> {
        (self.f)(task_type.clone(), input.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::task::Task;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Len;

    #[async_trait]
    impl Task<String, usize> for Len {
        async fn execute(&self, input: String) -> Result<usize, TaskError> {
            Ok(input.len())
        }
    }

    #[tokio::test]
    async fn each_call_builds_a_new_instance() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let factory = FactoryFn::new(move |_ty: TaskType, _input: String| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok(TaskInstance::<String, usize>::plain(Len)) }
        });

        let ty = TaskType::new("len");
        let first = factory.create(&ty, &"abc".to_string()).await.unwrap();
        let second = factory.create(&ty, &"abcd".to_string()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(first.execute("abc".into()).await.unwrap(), 3);
        assert_eq!(second.execute("abcd".into()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn construction_errors_pass_through() {
        let factory = FactoryFn::new(|ty: TaskType, _input: String| async move {
            Err::<TaskInstance<String, usize>, _>(TaskError::Construction {
                task_type: ty.name().to_string(),
                error: "unknown".into(),
            })
        });

        let err = factory
            .create(&TaskType::new("missing"), &String::new())
            .await
            .unwrap_err();
        assert!(err.is_construction());
        assert_eq!(err.to_string(), "failed to construct task missing: unknown");
    }
}
