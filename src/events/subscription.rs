//! # Streaming and one-shot subscriptions.
//!
//! Both modes sit on top of the same broadcast [`Bus`](super::Bus) receiver and
//! therefore observe events in exactly the order they were published:
//! - [`stream`] yields every future event of one [`EventKind`] and ends when the bus closes;
//! - [`once`] resolves with the next event of one kind, then detaches.
//!
//! The receiver is taken when the subscription is created, not when it is first
//! polled, so an event published right after subscribing is never missed.

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream};
use tokio::sync::broadcast::{self, error::RecvError};

use super::event::{Event, EventKind};

/// Stream of handle events of one kind.
pub type EventStream<O> = BoxStream<'static, Event<O>>;

/// Future resolving to the next handle event of one kind (`None` if the handle was disposed).
pub type OnceEvent<O> = BoxFuture<'static, Option<Event<O>>>;

/// Receives the next event matching `kind`, skipping (and logging) lag gaps.
async fn next_of_kind<O>(rx: &mut broadcast::Receiver<Event<O>>, kind: EventKind) -> Option<Event<O>>
where
    O: Clone + Send + 'static,
{
    loop {
        match rx.recv().await {
            Ok(ev) if ev.kind() == kind => return Some(ev),
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(
                    kind = kind.as_label(),
                    skipped,
                    "event subscription lagged; oldest events dropped"
                );
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Turns `rx` into a stream of every event matching `kind`.
pub(crate) fn stream<O>(rx: broadcast::Receiver<Event<O>>, kind: EventKind) -> EventStream<O>
where
    O: Clone + Send + Sync + 'static,
{
    stream::unfold(rx, move |mut rx| async move {
        next_of_kind(&mut rx, kind).await.map(|ev| (ev, rx))
    })
    .boxed()
}

/// Turns `rx` into a future resolving with the first event matching `kind`.
pub(crate) fn once<O>(mut rx: broadcast::Receiver<Event<O>>, kind: EventKind) -> OnceEvent<O>
where
    O: Clone + Send + Sync + 'static,
{
    Box::pin(async move { next_of_kind(&mut rx, kind).await })
}
