//! Per-field debounce timers.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::trace;
use tokio_util::sync::CancellationToken;

use super::lock;

/// Coalesces bursts of value changes into one delayed evaluation per field.
///
/// Scheduling a task for a field cancels the task still waiting for that
/// field. A zero delay runs the task right away, in the caller's task.
///
/// Cheap to clone; clones share the same timers.
#[derive(Debug, Clone, Default)]
pub struct DebounceScheduler {
    inner: Arc<SchedulerInner>,
}

#[derive(Debug, Default)]
struct SchedulerInner {
    pending: Mutex<HashMap<String, PendingTask>>,
    next_id: AtomicU64,
}

#[derive(Debug)]
struct PendingTask {
    id: u64,
    cancel: CancellationToken,
}

impl SchedulerInner {
    /// Removes the entry for `field` if it still belongs to task `id`.
    fn finish(&self, field: &str, id: u64) -> bool {
        let mut pending = lock(&self.pending);
        match pending.get(field) {
            Some(task) if task.id == id => {
                pending.remove(field);
                true
            }
            _ => false,
        }
    }
}

impl DebounceScheduler {
    /// Creates a scheduler with no pending tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` for `field` after `delay` of inactivity.
    ///
    /// Any task still waiting for `field` is cancelled. With a zero delay the
    /// task is awaited here; otherwise it is spawned onto the tokio runtime
    /// and this returns immediately.
    pub async fn schedule<F>(&self, field: &str, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if delay.is_zero() {
            self.cancel(field);
            trace!("Running {field} immediately");
            task.await;
            return;
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let previous = lock(&self.inner.pending).insert(
            field.to_string(),
            PendingTask {
                id,
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }
        trace!("Scheduled {field} in {delay:?}");

        let inner = Arc::clone(&self.inner);
        let field = field.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    trace!("Debounced task for {field} superseded");
                }
                _ = tokio::time::sleep(delay) => {
                    if inner.finish(&field, id) {
                        task.await;
                    }
                }
            }
        });
    }

    /// Cancels the task waiting for `field`. Returns `true` if one was.
    pub fn cancel(&self, field: &str) -> bool {
        match lock(&self.inner.pending).remove(field) {
            Some(task) => {
                task.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every waiting task.
    pub fn cancel_all(&self) {
        for (_, task) in lock(&self.inner.pending).drain() {
            task.cancel.cancel();
        }
    }

    /// Returns `true` if a task is waiting for `field`.
    pub fn is_pending(&self, field: &str) -> bool {
        lock(&self.inner.pending).contains_key(field)
    }

    /// Returns the number of waiting tasks.
    pub fn pending_count(&self) -> usize {
        lock(&self.inner.pending).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_once_with_last_value() {
        let scheduler = DebounceScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        for value in ["a", "ab", "abc"] {
            let tx = tx.clone();
            scheduler
                .schedule("name", Duration::from_millis(100), async move {
                    let _ = tx.send(value);
                })
                .await;
            sleep(Duration::from_millis(50)).await;
        }
        assert!(scheduler.is_pending("name"));

        sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.recv().await, Some("abc"));
        assert!(rx.try_recv().is_err());
        assert!(!scheduler.is_pending("name"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_runs_inline() {
        let scheduler = DebounceScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        scheduler
            .schedule("choice", Duration::ZERO, async move {
                let _ = tx.send(1);
            })
            .await;
        assert_eq!(rx.try_recv(), Ok(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_cancels_waiting_task() {
        let scheduler = DebounceScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let slow = tx.clone();
        scheduler
            .schedule("f", Duration::from_millis(100), async move {
                let _ = slow.send("slow");
            })
            .await;
        scheduler
            .schedule("f", Duration::ZERO, async move {
                let _ = tx.send("now");
            })
            .await;
        sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.recv().await, Some("now"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let scheduler = DebounceScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        scheduler
            .schedule("f", Duration::from_millis(10), async move {
                let _ = tx.send(());
            })
            .await;
        assert!(scheduler.cancel("f"));
        assert!(!scheduler.cancel("f"));
        sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fields_are_independent() {
        let scheduler = DebounceScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        for field in ["a", "b"] {
            let tx = tx.clone();
            scheduler
                .schedule(field, Duration::from_millis(10), async move {
                    let _ = tx.send(field);
                })
                .await;
        }
        assert_eq!(scheduler.pending_count(), 2);
        sleep(Duration::from_millis(20)).await;
        let mut got = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        got.sort();
        assert_eq!(got, vec!["a", "b"]);
    }
}
