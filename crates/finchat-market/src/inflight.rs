//! In-flight request de-duplication
//!
//! At most one origin fetch per key runs at a time. Callers arriving while a
//! fetch is pending await the same shared future and observe the same value.
//! The key is released when the fetch settles, so later calls start fresh.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

type Pending<V> = Arc<Mutex<HashMap<String, Shared<BoxFuture<'static, V>>>>>;

fn lock<V>(pending: &Pending<V>) -> MutexGuard<'_, HashMap<String, Shared<BoxFuture<'static, V>>>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keyed registry of pending fetches
pub struct InflightRegistry<V> {
    pending: Pending<V>,
}

impl<V> InflightRegistry<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Join the pending fetch for `key`, or start one with `fetch`
    pub async fn run<F, Fut>(&self, key: &str, fetch: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let shared = {
            let mut pending = lock(&self.pending);
            if let Some(existing) = pending.get(key) {
                debug!(key, "Joining in-flight fetch");
                existing.clone()
            } else {
                let release = Release {
                    key: key.to_string(),
                    pending: Arc::clone(&self.pending),
                };
                let inner = fetch();
                let shared = async move {
                    let _release = release;
                    inner.await
                }
                .boxed()
                .shared();
                pending.insert(key.to_string(), shared.clone());
                shared
            }
        };

        shared.await
    }

    /// Whether a fetch for `key` is currently pending
    #[must_use]
    pub fn is_pending(&self, key: &str) -> bool {
        lock(&self.pending).contains_key(key)
    }

    /// Number of pending keys
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Whether nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for InflightRegistry<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the registry entry when the fetch future is dropped, which
/// happens on completion (either outcome) or when every waiter goes away.
struct Release<V> {
    key: String,
    pending: Pending<V>,
}

impl<V> Drop for Release<V> {
    fn drop(&mut self) {
        let removed = lock(&self.pending).remove(&self.key);
        drop(removed);
    }
}
