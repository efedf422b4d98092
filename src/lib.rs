//! # taskhandle
//!
//! **taskhandle** wraps a single unit of asynchronous work in a handle with an
//! explicit, concurrency-safe lifecycle.
//!
//! It is the per-task building block an orchestrator (a queue, a scheduler, a
//! pipeline) composes: the orchestrator decides *when* to run, suspend, resume or
//! kill; the handle makes sure each request results in a consistent state and a
//! published event.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   orchestrator ──► run / suspend / resume / kill / reset / dispose
//!                              │
//! ┌────────────────────────────▼──────────────────────────────────────┐
//! │  TaskHandle                                                       │
//! │  - transition lock (serializes control ops and settlement)        │
//! │  - TaskFactory (fresh TaskInstance per start)                     │
//! │  - Execution (instance + CancellationToken + JoinHandle + epoch)  │
//! │  - Bus (broadcast of StateChanged / Completed / Failed)           │
//! └──────┬─────────────────────────────────────────────┬──────────────┘
//!        ▼                                             ▼
//!  runtime.spawn(run_once)                  ┌──────────┴──────────┐
//!   execute ─► clean_up ─► settle            ▼                     ▼
//!                                     on_any / once         SubscriberSet
//!                                     (streams, futures)    (per-sub queues)
//! ```
//!
//! ### Lifecycle
//! ```text
//!             run                 suspend            resume
//! Waiting ──────────► Running ──────────► Suspended ─────────► Running
//!    ▲                 │  │                  │
//!    │ reset           │  └── execute Ok ──► Complete ◄── execute Ok ─┘
//!    │                 ├───── execute Err ─► Failed
//!    │                 └───── kill ────────► Killed ── run ──► Running
//!    └──────────────── Complete / Failed / Killed
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types / traits                              |
//! |-------------------|------------------------------------------------------------|-------------------------------------------------|
//! | **Handle**        | Lifecycle state machine and control operations.            | [`TaskHandle`], [`HandleBuilder`], [`TaskState`]|
//! | **Tasks**         | Capabilities a unit of work implements.                    | [`Task`], [`SuspendableTask`], [`TaskInstance`] |
//! | **Factories**     | Fresh instances per run.                                   | [`TaskFactory`], [`FactoryFn`], [`TaskType`]    |
//! | **Events**        | Ordered lifecycle notifications.                           | [`Event`], [`EventKind`], [`HandleEvent`]       |
//! | **Subscriber API**| Long-lived event handlers with isolated queues.            | [`Subscribe`], [`SubscriberSet`]                |
//! | **Errors**        | Typed errors for task failures and handle queries.         | [`TaskError`], [`HandleError`]                  |
//! | **Configuration** | Per-handle settings.                                       | [`HandleConfig`]                                |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use futures::StreamExt;
//! use taskhandle::{EventKind, FactoryFn, Task, TaskError, TaskHandle, TaskInstance, TaskState, TaskType};
//!
//! struct Sleeper;
//!
//! #[async_trait]
//! impl Task<u64, u64> for Sleeper {
//!     async fn execute(&self, millis: u64) -> Result<u64, TaskError> {
//!         tokio::time::sleep(Duration::from_millis(millis)).await;
//!         Ok(millis)
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let factory = FactoryFn::arc(|_ty: TaskType, _millis: u64| async move {
//!         Ok(TaskInstance::<u64, u64>::plain(Sleeper))
//!     });
//!     let handle = TaskHandle::builder(
//!         factory,
//!         tokio::runtime::Handle::current(),
//!         TaskType::of::<Sleeper>(),
//!         10,
//!     )
//!     .cost(3)
//!     .build();
//!
//!     let mut states = handle.on_any(EventKind::StateChanged);
//!     handle.run().await;
//!
//!     assert_eq!(states.next().await.and_then(|e| e.state()), Some(TaskState::Running));
//!     assert_eq!(states.next().await.and_then(|e| e.state()), Some(TaskState::Complete));
//!     assert_eq!(handle.output(), Ok(10));
//!
//!     handle.dispose().await;
//!     assert!(states.next().await.is_none());
//! }
//! ```
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{
    HandleBuilder, HandleConfig, ResumeResult, RunCondition, SuspendResult, TaskHandle, TaskState,
};
pub use error::{HandleError, TaskError};
pub use events::{Event, EventKind, EventStream, HandleEvent, OnceEvent};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{FactoryFn, SuspendableTask, Task, TaskFactory, TaskInstance, TaskType};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
