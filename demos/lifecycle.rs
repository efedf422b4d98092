//! Walks a single handle through its lifecycle:
//! run → suspend → resume → complete, then reset → run → kill → run → complete.
//!
//! ```text
//! RUST_LOG=info cargo run --example lifecycle --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

use taskhandle::{
    EventKind, HandleConfig, LogWriter, Subscribe, SuspendableTask, Task, TaskError, TaskFactory,
    TaskHandle, TaskInstance, TaskType,
};

/// Counts to `target`, one tick every 100ms, honoring pause requests.
struct Counter {
    paused: AtomicBool,
    wake: Notify,
    ticks: AtomicU32,
}

#[async_trait]
impl Task<u32, u32> for Counter {
    async fn execute(&self, target: u32) -> Result<u32, TaskError> {
        while self.ticks.load(Ordering::SeqCst) < target {
            while self.paused.load(Ordering::SeqCst) {
                let notified = self.wake.notified();
                if !self.paused.load(Ordering::SeqCst) {
                    break;
                }
                notified.await;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
            let n = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!(tick = n, target, "counter tick");
        }
        Ok(target)
    }

    async fn clean_up(&self) -> Result<(), TaskError> {
        tracing::info!(ticks = self.ticks.load(Ordering::SeqCst), "counter released");
        Ok(())
    }
}

#[async_trait]
impl SuspendableTask<u32, u32> for Counter {
    async fn try_suspend(&self) -> bool {
        !self.paused.swap(true, Ordering::SeqCst)
    }

    async fn try_resume(&self) -> bool {
        let was_paused = self.paused.swap(false, Ordering::SeqCst);
        self.wake.notify_waiters();
        was_paused
    }
}

struct CounterFactory;

#[async_trait]
impl TaskFactory<u32, u32> for CounterFactory {
    async fn create(&self, task_type: &TaskType, _input: &u32) -> Result<TaskInstance<u32, u32>, TaskError> {
        tracing::info!(%task_type, "creating instance");
        Ok(TaskInstance::suspendable(Counter {
            paused: AtomicBool::new(false),
            wake: Notify::new(),
            ticks: AtomicU32::new(0),
        }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let subs: Vec<Arc<dyn Subscribe<u32>>> = vec![Arc::new(LogWriter::new())];
    let handle = TaskHandle::builder(
        Arc::new(CounterFactory),
        tokio::runtime::Handle::current(),
        TaskType::new("demo.counter"),
        5,
    )
    .cost(1)
    .config(HandleConfig {
        kill_grace: Duration::from_secs(1),
        ..HandleConfig::default()
    })
    .with_subscribers(subs)
    .build();

    let done = handle.once(EventKind::Completed);
    handle.run().await;
    tokio::time::sleep(Duration::from_millis(250)).await;

    tracing::info!(result = ?handle.suspend().await, "suspend");
    tokio::time::sleep(Duration::from_millis(300)).await;
    tracing::info!(result = ?handle.resume().await, "resume");

    let completed = done.await.and_then(|ev| ev.output().copied());
    tracing::info!(?completed, state = %handle.state(), "first run finished");

    handle.reset().await;
    handle.run().await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.kill().await;
    tracing::info!(state = %handle.state(), "killed mid-run");

    let done = handle.once(EventKind::Completed);
    handle.run().await;
    done.await;
    tracing::info!(output = ?handle.output(), "rerun finished");

    handle.dispose().await;
    // give the log subscriber a moment to drain
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
