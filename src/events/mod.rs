//! Handle events: types, broadcast bus and subscriptions.
//!
//! This module groups the event **data model**, the per-handle **bus** and the two
//! **subscription modes** built on it.
//!
//! ## Contents
//! - [`EventKind`], [`HandleEvent`], [`Event`] event classification, payload and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`, owned by one handle
//! - [`EventStream`] / [`OnceEvent`] streaming and one-shot subscriptions
//!
//! ## Quick reference
//! - **Publisher**: the owning `TaskHandle`, always under its transition lock.
//! - **Consumers**: `TaskHandle::on_any`, `TaskHandle::once`, and the
//!   `SubscriberSet` listener started by `TaskHandle::attach`.

mod bus;
mod event;
mod subscription;

pub(crate) use bus::Bus;
pub use event::{Event, EventKind, HandleEvent};
pub use subscription::{EventStream, OnceEvent};

pub(crate) use subscription::{once, stream};
