//! # Per-handle event bus.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] owned by one task
//! handle. The handle publishes while holding its transition lock, so every
//! receiver sees events in transition order.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits on receivers.
//! - **Bounded capacity**: one ring buffer shared by all receivers.
//! - **Lag handling**: slow receivers skip the oldest items (logged by the consumer).
//! - **No persistence**: receivers only observe events sent after they subscribed.
//! - **Closable**: after [`Bus::close`] every receiver drains what it has and then ends.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use super::event::{Event, HandleEvent};

/// Broadcast channel for the events of a single handle.
pub struct Bus<O> {
    tx: RwLock<Option<broadcast::Sender<Event<O>>>>,
    seq: AtomicU64,
    task: Arc<str>,
}

impl<O> Bus<O>
where
    O: Clone + Send + Sync + 'static,
{
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize, task: impl Into<Arc<str>>) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            tx: RwLock::new(Some(tx)),
            seq: AtomicU64::new(0),
            task: task.into(),
        }
    }

    /// Stamps `body` with the next sequence number and sends it to all receivers.
    ///
    /// Dropped silently when there are no receivers or the bus is closed.
    pub fn publish(&self, body: HandleEvent<O>) {
        let guard = self.tx.read().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = guard.as_ref() {
            let seq = self.seq.fetch_add(1, Ordering::Relaxed);
            let _ = tx.send(Event::new(seq, Arc::clone(&self.task), body));
        }
    }

    /// Creates a new receiver that observes subsequent events.
    ///
    /// On a closed bus the receiver is already terminated.
    pub fn subscribe(&self) -> broadcast::Receiver<Event<O>> {
        let guard = self.tx.read().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = broadcast::channel(1);
                drop(tx);
                rx
            }
        }
    }

    /// Drops the sender; receivers end after draining buffered events.
    pub fn close(&self) {
        self.tx.write().unwrap_or_else(|e| e.into_inner()).take();
    }

    /// True once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.tx
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TaskState;
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn sequence_numbers_increase() {
        let bus: Bus<()> = Bus::new(8, "t");
        let mut rx = bus.subscribe();

        bus.publish(HandleEvent::StateChanged(TaskState::Running));
        bus.publish(HandleEvent::StateChanged(TaskState::Complete));
        bus.publish(HandleEvent::Completed(()));

        let seqs: Vec<u64> = vec![
            rx.recv().await.unwrap().seq,
            rx.recv().await.unwrap().seq,
            rx.recv().await.unwrap().seq,
        ];
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let bus: Bus<u8> = Bus::new(8, "t");
        let mut rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);

        bus.publish(HandleEvent::Completed(1));
        bus.close();
        bus.publish(HandleEvent::Completed(2));

        assert!(bus.is_closed());
        assert_eq!(rx.recv().await.unwrap().output(), Some(&1));
        assert!(matches!(rx.recv().await, Err(RecvError::Closed)));
    }

    #[tokio::test]
    async fn subscribe_after_close_is_terminated() {
        let bus: Bus<u8> = Bus::new(8, "t");
        bus.close();
        let mut rx = bus.subscribe();
        assert!(matches!(rx.recv().await, Err(RecvError::Closed)));
        assert_eq!(bus.receiver_count(), 0);
    }

    #[tokio::test]
    async fn slow_receiver_lags() {
        let bus: Bus<u8> = Bus::new(2, "t");
        let mut rx = bus.subscribe();
        for i in 0..5 {
            bus.publish(HandleEvent::Completed(i));
        }
        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(rx.recv().await.unwrap().output(), Some(&3));
    }
}
