//! A FIFO concurrency limiter for outbound requests.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Bounds how many tasks run at once, admitting queued tasks in submission order.
///
/// Admission goes through a fair semaphore: a slot freed by a finishing task
/// (successful, failed, or dropped) goes to the longest-waiting task.
///
/// # Examples
///
/// ```
/// use repo_explorer::queue::RequestQueue;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let queue = RequestQueue::new(2);
/// let value = queue.add(|| async { 40 + 2 }).await;
/// assert_eq!(value, 42);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RequestQueue {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    active: Arc<AtomicUsize>,
}

impl RequestQueue {
    /// Creates a queue allowing `max_concurrent` simultaneous tasks (at least one).
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Waits for a free slot, then builds and runs the task.
    ///
    /// The factory is not called until the task is admitted.
    pub async fn add<F, Fut, T>(&self, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        // The semaphore is owned here and never closed, so acquisition only
        // fails if that invariant is broken; run unbounded rather than drop work.
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => Some(permit),
            Err(_) => {
                log::warn!("Request queue semaphore closed; running task without a slot.");
                None
            }
        };
        let _active = ActiveGuard::enter(&self.active);
        task().await
    }

    /// The configured concurrency ceiling.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Number of tasks currently running.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl<'a> ActiveGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
