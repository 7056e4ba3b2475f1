//! De-duplication of concurrent requests for the same resource.
//!
//! At most one underlying operation is in flight per key. Every caller that
//! asks for a key while it is outstanding joins the same shared future and
//! observes the identical outcome.

use crate::errors::{Error, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The shared handle every caller of a coalesced key awaits.
pub type SharedRequest<V> = Shared<BoxFuture<'static, Result<V>>>;

struct Pending<V> {
    next_id: u64,
    in_flight: HashMap<String, (u64, SharedRequest<V>)>,
}

/// Coalesces concurrent requests by key.
///
/// The underlying future is spawned onto the tokio runtime, so it runs to
/// completion even when every waiter stops waiting (for example after a
/// timeout). It deregisters itself once it settles, on success and on failure.
pub struct RequestCoalescer<V> {
    pending: Arc<Mutex<Pending<V>>>,
}

fn lock<V>(pending: &Mutex<Pending<V>>) -> MutexGuard<'_, Pending<V>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<V> RequestCoalescer<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a coalescer with no pending requests.
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(Pending {
                next_id: 0,
                in_flight: HashMap::new(),
            })),
        }
    }

    /// Joins the outstanding request for `key`, or starts one with `factory`.
    ///
    /// `factory` is invoked only when no request for `key` is in flight.
    /// Must be called from within a tokio runtime.
    pub fn run<F, Fut>(&self, key: &str, factory: F) -> SharedRequest<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let mut pending = lock(&self.pending);
        if let Some((_, request)) = pending.in_flight.get(key) {
            log::debug!("Joining in-flight request: {}", key);
            return request.clone();
        }

        let id = pending.next_id;
        pending.next_id += 1;

        let registry = Arc::clone(&self.pending);
        let owned_key = key.to_string();
        let operation = factory();
        let task = tokio::spawn(async move {
            let outcome = operation.await;
            let mut pending = lock(&registry);
            // Only remove our own registration; a clear() may have let a newer
            // request take this key.
            if matches!(pending.in_flight.get(&owned_key), Some((current, _)) if *current == id) {
                pending.in_flight.remove(&owned_key);
            }
            outcome
        });

        let request: SharedRequest<V> = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(Error::Internal(format!(
                    "request task failed: {}",
                    join_error
                ))),
            }
        }
        .boxed()
        .shared();

        pending
            .in_flight
            .insert(key.to_string(), (id, request.clone()));
        request
    }

    /// Number of keys with a request in flight.
    pub fn in_flight(&self) -> usize {
        lock(&self.pending).in_flight.len()
    }

    /// Forgets every pending request.
    ///
    /// Requests already sent keep running; new callers simply no longer join
    /// them.
    pub fn clear(&self) {
        let mut pending = lock(&self.pending);
        if !pending.in_flight.is_empty() {
            log::debug!(
                "Forgetting {} in-flight request(s).",
                pending.in_flight.len()
            );
        }
        pending.in_flight.clear();
    }
}

impl<V> Default for RequestCoalescer<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
