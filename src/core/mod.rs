//! Handle core: state machine and execution.
//!
//! The public API from this module is [`TaskHandle`] with its builder,
//! configuration, states and control-operation results.
//!
//! Internal modules:
//! - [`handle`]: the state machine, transition lock and event publication;
//! - [`actor`]: the execution unit of one run (instance, token, join handle, epoch);
//! - [`runner`]: the spawned body of one run (execute, cleanup, settle);
//! - [`builder`]: optional construction settings;
//! - [`config`]: per-handle settings;
//! - [`state`]: lifecycle states and suspend/resume results.

mod actor;
mod builder;
mod config;
mod handle;
mod runner;
mod state;

pub use builder::HandleBuilder;
pub use config::HandleConfig;
pub use handle::{RunCondition, TaskHandle};
pub use state::{ResumeResult, SuspendResult, TaskState};
