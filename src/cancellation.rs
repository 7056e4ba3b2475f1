//! Provides a token-based mechanism for graceful cancellation of file loads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// A token that signals cancellation to long-running fetches.
///
/// Cloneable and thread-safe. Synchronous code polls
/// [`is_cancelled`](Self::is_cancelled); async code can await
/// [`cancelled`](Self::cancelled) inside a `select!`.
///
/// # Examples
///
/// ```
/// use repo_explorer::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let token = CancellationToken::new();
/// let waiter = token.clone();
///
/// let handle = tokio::spawn(async move {
///     waiter.cancelled().await;
///     "stopped"
/// });
///
/// token.cancel();
/// assert_eq!(handle.await.unwrap(), "stopped");
/// assert!(token.is_cancelled());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    /// Creates a new `CancellationToken` in a non-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to this token and all of its clones.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Returns `true` once `cancel()` has been called on this token or any clone.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Completes when the token is cancelled. Returns at once if it already is.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so a concurrent cancel() is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
