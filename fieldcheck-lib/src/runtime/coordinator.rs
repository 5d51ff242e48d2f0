//! Generation tracking for asynchronous validation results.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;
use tokio::task::JoinHandle;

use super::lock;

/// Applies asynchronous results only while they are still the latest.
///
/// Every evaluation of a field starts a new generation. A result computed
/// for an older generation is dropped without side effects; the future that
/// produced it is not cancelled.
///
/// Generations are unique across all fields and never reused, so a field
/// that unregisters and registers again cannot accept a result meant for
/// its earlier life.
///
/// Apply closures run while the generation table is locked. They may take
/// other locks, but nothing may take the generation table while holding
/// one of those.
///
/// # Example
///
/// ```
/// use fieldcheck_lib::runtime::AsyncValidationCoordinator;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let coordinator = AsyncValidationCoordinator::new();
/// let first = coordinator.submit("user", async { false }, |_| {});
/// let second = coordinator.submit("user", async { true }, |_| {});
///
/// assert!(!first.handle.await.unwrap());
/// assert!(second.handle.await.unwrap());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AsyncValidationCoordinator {
    inner: Arc<CoordinatorInner>,
}

#[derive(Debug, Default)]
struct CoordinatorInner {
    generations: Mutex<HashMap<String, u64>>,
    counter: AtomicU64,
}

/// A submitted asynchronous validation.
#[derive(Debug)]
pub struct Submission {
    /// Generation the result belongs to.
    pub generation: u64,
    /// Resolves to `true` if the result was applied, `false` if it was stale.
    pub handle: JoinHandle<bool>,
}

impl AsyncValidationCoordinator {
    /// Creates a coordinator with no tracked fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation for `field`, making every older one stale.
    pub fn begin(&self, field: &str) -> u64 {
        let generation = self.inner.counter.fetch_add(1, Ordering::Relaxed) + 1;
        lock(&self.inner.generations).insert(field.to_string(), generation);
        generation
    }

    /// Makes every outstanding result for `field` stale.
    pub fn invalidate(&self, field: &str) {
        self.begin(field);
    }

    /// Stops tracking `field`. Outstanding results become stale.
    pub fn forget(&self, field: &str) {
        lock(&self.inner.generations).remove(field);
    }

    /// Returns the current generation of `field`.
    pub fn current(&self, field: &str) -> Option<u64> {
        lock(&self.inner.generations).get(field).copied()
    }

    /// Returns `true` if `generation` is still the latest for `field`.
    pub fn is_current(&self, field: &str, generation: u64) -> bool {
        self.current(field) == Some(generation)
    }

    /// Runs `apply` if `generation` is still the latest for `field`.
    ///
    /// The check and the call happen under one lock, so no newer generation
    /// can start in between.
    pub fn apply_if_current<R>(&self, field: &str, generation: u64, apply: impl FnOnce() -> R) -> Option<R> {
        let generations = lock(&self.inner.generations);
        if generations.get(field) != Some(&generation) {
            debug!("Discarding stale result for {field} (generation {generation})");
            return None;
        }
        let result = apply();
        drop(generations);
        Some(result)
    }

    /// Awaits `future` in a new task and hands its output to `apply` if
    /// `generation` is still the latest for `field` by then.
    pub fn spawn<Fut, A>(&self, field: &str, generation: u64, future: Fut, apply: A) -> JoinHandle<bool>
    where
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
        A: FnOnce(Fut::Output) + Send + 'static,
    {
        let coordinator = self.clone();
        let field = field.to_string();
        tokio::spawn(async move {
            let output = future.await;
            coordinator
                .apply_if_current(&field, generation, move || apply(output))
                .is_some()
        })
    }

    /// Starts a new generation and spawns `future` for it.
    pub fn submit<Fut, A>(&self, field: &str, future: Fut, apply: A) -> Submission
    where
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
        A: FnOnce(Fut::Output) + Send + 'static,
    {
        let generation = self.begin(field);
        let handle = self.spawn(field, generation, future, apply);
        Submission { generation, handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_out_of_order_resolution_keeps_latest() {
        let coordinator = AsyncValidationCoordinator::new();
        let applied = Arc::new(Mutex::new(Vec::new()));

        let (first_tx, first_rx) = oneshot::channel::<&str>();
        let (second_tx, second_rx) = oneshot::channel::<&str>();

        let sink = Arc::clone(&applied);
        let first = coordinator.submit("user", async move { first_rx.await.unwrap() }, move |v| {
            sink.lock().unwrap().push(v)
        });
        let sink = Arc::clone(&applied);
        let second = coordinator.submit("user", async move { second_rx.await.unwrap() }, move |v| {
            sink.lock().unwrap().push(v)
        });

        second_tx.send("second").unwrap();
        assert!(second.handle.await.unwrap());
        first_tx.send("first").unwrap();
        assert!(!first.handle.await.unwrap());

        assert_eq!(*applied.lock().unwrap(), vec!["second"]);
    }

    #[tokio::test]
    async fn test_invalidate_and_forget() {
        let coordinator = AsyncValidationCoordinator::new();
        let generation = coordinator.begin("f");
        assert!(coordinator.is_current("f", generation));

        coordinator.invalidate("f");
        assert!(!coordinator.is_current("f", generation));
        assert_eq!(coordinator.apply_if_current("f", generation, || 1), None);

        let generation = coordinator.begin("f");
        coordinator.forget("f");
        assert_eq!(coordinator.current("f"), None);
        assert_eq!(coordinator.apply_if_current("f", generation, || 1), None);
    }

    #[tokio::test]
    async fn test_generations_unique_across_fields() {
        let coordinator = AsyncValidationCoordinator::new();
        let a = coordinator.begin("a");
        let b = coordinator.begin("b");
        assert_ne!(a, b);
        coordinator.forget("a");
        assert_ne!(coordinator.begin("a"), a);
    }
}
