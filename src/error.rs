//! Error types used by task handles and the tasks they drive.
//!
//! This module defines two main error enums:
//!
//! - [`HandleError`] - misuse of a handle by its caller (reading a result in the wrong state).
//! - [`TaskError`] - failures produced while constructing, executing or cleaning up a task.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

use crate::core::TaskState;

/// # Errors returned synchronously by a [`TaskHandle`](crate::TaskHandle).
///
/// These signal programmer misuse, not task failures. Task failures are captured
/// into the handle state and announced through events instead.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleError {
    /// A result accessor was used while the handle was in a state that has no such result.
    #[error("invalid state: expected {expected}, found {actual}")]
    InvalidState {
        /// The state the accessor requires.
        expected: TaskState,
        /// The state the handle was in.
        actual: TaskState,
    },
}

impl HandleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskhandle::{HandleError, TaskState};
    ///
    /// let err = HandleError::InvalidState { expected: TaskState::Complete, actual: TaskState::Running };
    /// assert_eq!(err.as_label(), "handle_invalid_state");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandleError::InvalidState { .. } => "handle_invalid_state",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandleError::InvalidState { expected, actual } => {
                format!("requires state {expected}, handle is {actual}")
            }
        }
    }
}

/// # Errors produced by task construction and execution.
///
/// The message of the failure is preserved verbatim so it can be retrieved later
/// through [`TaskHandle::error`](crate::TaskHandle::error).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task execution failed.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The factory could not produce a task instance.
    #[error("failed to construct task {task_type}: {error}")]
    Construction {
        /// Name of the requested task type.
        task_type: String,
        /// The underlying error message.
        error: String,
    },

    /// Best-effort cleanup failed.
    #[error("cleanup failed: {error}")]
    CleanUp {
        /// The underlying error message.
        error: String,
    },

    /// Task execution panicked.
    #[error("task panicked: {error}")]
    Panicked {
        /// Panic payload rendered as text (when it was a string).
        error: String,
    },
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use taskhandle::TaskError;
    ///
    /// let err = TaskError::fail("This is a random failure");
    /// assert_eq!(err.to_string(), "This is a random failure");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`TaskError::CleanUp`].
    pub fn clean_up(error: impl Into<String>) -> Self {
        TaskError::CleanUp {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Construction { .. } => "task_construction_failed",
            TaskError::CleanUp { .. } => "task_cleanup_failed",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns the underlying message without any prefix.
    pub fn as_message(&self) -> &str {
        match self {
            TaskError::Fail { error }
            | TaskError::Construction { error, .. }
            | TaskError::CleanUp { error }
            | TaskError::Panicked { error } => error,
        }
    }

    /// True if the factory failed before any execution started.
    pub fn is_construction(&self) -> bool {
        matches!(self, TaskError::Construction { .. })
    }

    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let error = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskError::Panicked { error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_preserves_message_verbatim() {
        let err = TaskError::fail("This is a random failure");
        assert_eq!(err.as_message(), "This is a random failure");
        assert_eq!(err.to_string(), "This is a random failure");
        assert_eq!(err.as_label(), "task_failed");
    }

    #[test]
    fn construction_display_names_task_type() {
        let err = TaskError::Construction {
            task_type: "demo::Sleeper".into(),
            error: "no such resource".into(),
        };
        assert!(err.is_construction());
        assert_eq!(
            err.to_string(),
            "failed to construct task demo::Sleeper: no such resource"
        );
        assert_eq!(err.as_message(), "no such resource");
    }

    #[test]
    fn panic_payloads_are_rendered() {
        let err = TaskError::from_panic(Box::new("boom"));
        assert_eq!(err, TaskError::Panicked { error: "boom".into() });

        let err = TaskError::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(err.as_message(), "owned boom");

        let err = TaskError::from_panic(Box::new(42_u8));
        assert_eq!(err.as_message(), "non-string panic payload");
    }

    #[test]
    fn invalid_state_message() {
        let err = HandleError::InvalidState {
            expected: TaskState::Failed,
            actual: TaskState::Complete,
        };
        assert_eq!(err.to_string(), "invalid state: expected failed, found complete");
        assert_eq!(err.as_message(), "requires state failed, handle is complete");
    }
}
