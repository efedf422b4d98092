//! # SubscriberSet: non-blocking fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Event`] of one handle to multiple
//! subscribers **without awaiting** their processing.
//!
//! ## What it guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-subscriber FIFO (queue order), which is the handle's transition order.
//! - Panics inside subscribers are caught and logged (isolation).
//!
//! ## What it does **not** guarantee
//! - No ordering across different subscribers.
//! - No retries on per-subscriber queue overflow (events are dropped for that
//!   subscriber).
//!
//! ## Diagram
//! ```text
//!  Bus ──► listener ──► emit(&Event)
//!                          │                        (Arc-clone per subscriber)
//!                          ├────────────────► [queue S1] ─► worker S1 ─► on_event()
//!                          ├────────────────► [queue S2] ─► worker S2 ─► on_event()
//!                          └────────────────► [queue SN] ─► worker SN ─► on_event()
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::events::Event;

use super::Subscribe;

/// Per-subscriber channel with metadata
struct SubscriberChannel<O> {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event<O>>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet<O> {
    channels: Vec<SubscriberChannel<O>>,
    workers: Vec<JoinHandle<()>>,
}

impl<O> SubscriberSet<O>
where
    O: Clone + Send + Sync + 'static,
{
    /// Creates a new set and spawns one worker per subscriber on `runtime`.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe<O>>>, runtime: &Handle) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event<O>>>(cap);
            let s = Arc::clone(&sub);

            let handle = runtime.spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        tracing::error!(
                            subscriber = s.name(),
                            seq = ev.seq,
                            panic = ?panic_err,
                            "subscriber panicked"
                        );
                    }
                }
            });

            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self { channels, workers }
    }

    /// Fan-out one event to all subscribers (non-blocking).
    ///
    /// If a subscriber's queue is **full** or **closed**, the event is dropped for it
    /// and a warning is logged with the subscriber's name.
    pub fn emit(&self, event: &Event<O>) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        subscriber = channel.name,
                        seq = ev.seq,
                        "subscriber dropped event: queue full"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::warn!(
                        subscriber = channel.name,
                        seq = ev.seq,
                        "subscriber dropped event: worker closed"
                    );
                }
            }
        }
    }

    /// Forwards every event from `rx` until the bus closes, then shuts the set down.
    pub fn listen(self, mut rx: broadcast::Receiver<Event<O>>, runtime: &Handle) -> JoinHandle<()> {
        runtime.spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => self.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged; oldest events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            self.shutdown().await;
        })
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TaskState;
    use crate::events::{Bus, HandleEvent};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl Subscribe<()> for Recorder {
        async fn on_event(&self, ev: &Event<()>) {
            self.seen.lock().unwrap().push(ev.seq);
        }
    }

    struct Panicky;

    #[async_trait]
    impl Subscribe<()> for Panicky {
        async fn on_event(&self, _ev: &Event<()>) {
            panic!("subscriber bug");
        }

        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    #[tokio::test]
    async fn listener_preserves_order_and_survives_panics() {
        let bus: Bus<()> = Bus::new(16, "t");
        let recorder = Arc::new(Recorder::default());
        let subs: Vec<Arc<dyn Subscribe<()>>> = vec![Arc::new(Panicky), recorder.clone()];

        let set = SubscriberSet::new(subs, &Handle::current());
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        let listener = set.listen(bus.subscribe(), &Handle::current());

        bus.publish(HandleEvent::StateChanged(TaskState::Running));
        bus.publish(HandleEvent::StateChanged(TaskState::Complete));
        bus.publish(HandleEvent::Completed(()));
        bus.close();
        listener.await.unwrap();

        assert_eq!(*recorder.seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn empty_set_emits_nothing() {
        let set: SubscriberSet<()> = SubscriberSet::new(Vec::new(), &Handle::current());
        assert!(set.is_empty());
        set.emit(&Event::new(0, "t", HandleEvent::Completed(())));
        set.shutdown().await;
    }
}
