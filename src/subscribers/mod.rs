//! # Event subscribers for task handles.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! the optional built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   TaskHandle ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(&Event)
//!                                                              │
//!                                          ┌─────────┬─────────┼─────────┐
//!                                          ▼         ▼         ▼         ▼
//!                                      LogWriter  Metrics   Custom      ...
//! ```
//!
//! Subscribers are attached with `TaskHandle::attach` or `HandleBuilder::with_subscribers`.
//! The listener ends when the handle is disposed and its bus closes.

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
