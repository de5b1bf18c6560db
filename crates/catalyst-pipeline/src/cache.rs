//! Single-flight TTL cache.
//!
//! Per-key state machine: empty, computing, fresh, stale. At most one
//! caller computes a key at a time; concurrent callers are served the stale
//! value when one exists, or told the key is not ready yet. They never block
//! behind the computation. A failed computation leaves the previous value
//! servable and does not touch its timestamp.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// What the cache handed back for a key.
#[derive(Debug)]
pub enum CacheResponse<V> {
    /// A value within its TTL.
    Fresh(Arc<V>),
    /// The caller computed a new value just now.
    Computed(Arc<V>),
    /// An expired value, served because a computation is already running or
    /// because this caller's own computation failed.
    Stale(Arc<V>),
    /// Another caller is computing and no previous value exists.
    NotReady,
}

impl<V> CacheResponse<V> {
    pub fn value(&self) -> Option<&Arc<V>> {
        match self {
            Self::Fresh(v) | Self::Computed(v) | Self::Stale(v) => Some(v),
            Self::NotReady => None,
        }
    }
}

#[derive(Debug)]
struct SlotState<V> {
    value: Option<Arc<V>>,
    computed_at: Option<Instant>,
    computing: bool,
}

impl<V> Default for SlotState<V> {
    fn default() -> Self {
        Self {
            value: None,
            computed_at: None,
            computing: false,
        }
    }
}

#[derive(Debug)]
struct Slot<V> {
    state: Mutex<SlotState<V>>,
}

impl<V> Slot<V> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::default()),
        }
    }
}

/// Clears the computing flag if the computing caller's future is dropped,
/// so a cancelled caller cannot wedge the key forever.
struct ComputingGuard<'a, V> {
    slot: &'a Slot<V>,
}

impl<V> Drop for ComputingGuard<'_, V> {
    fn drop(&mut self) {
        let mut state = self
            .slot
            .state
            .lock()
            .expect("cache slot state should not be poisoned");
        state.computing = false;
    }
}

/// Keyed single-flight TTL cache. Cheap to clone; clones share state.
#[derive(Debug)]
pub struct SingleFlightCache<K, V> {
    slots: tokio::sync::RwLock<HashMap<K, Arc<Slot<V>>>>,
    ttl: Duration,
}

impl<K, V> SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: tokio::sync::RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Serve `key` from cache, or compute it via `compute` when the entry is
    /// missing or expired.
    ///
    /// Exactly one caller runs `compute` per key at a time. While it runs,
    /// other callers get [`CacheResponse::Stale`] or
    /// [`CacheResponse::NotReady`] immediately.
    ///
    /// # Errors
    ///
    /// Propagates the compute error only when there is no previous value to
    /// fall back on. The cached state is never poisoned by a failure.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: K,
        compute: F,
    ) -> Result<CacheResponse<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(&key).await;

        // Decide under the lock, never awaiting while holding it.
        {
            let mut state = slot
                .state
                .lock()
                .expect("cache slot state should not be poisoned");

            if let (Some(value), Some(computed_at)) = (&state.value, state.computed_at) {
                if computed_at.elapsed() < self.ttl {
                    return Ok(CacheResponse::Fresh(Arc::clone(value)));
                }
            }

            if state.computing {
                return Ok(match &state.value {
                    Some(value) => CacheResponse::Stale(Arc::clone(value)),
                    None => CacheResponse::NotReady,
                });
            }

            state.computing = true;
        }

        let guard = ComputingGuard { slot: slot.as_ref() };
        let outcome = compute().await;
        match outcome {
            Ok(value) => {
                let value = Arc::new(value);
                let mut state = slot
                    .state
                    .lock()
                    .expect("cache slot state should not be poisoned");
                state.value = Some(Arc::clone(&value));
                state.computed_at = Some(Instant::now());
                drop(state);
                drop(guard);
                Ok(CacheResponse::Computed(value))
            }
            Err(error) => {
                // Previous value (if any) stays servable with its original
                // timestamp.
                let stale = {
                    let state = slot
                        .state
                        .lock()
                        .expect("cache slot state should not be poisoned");
                    state.value.clone()
                };
                drop(guard);
                match stale {
                    Some(value) => Ok(CacheResponse::Stale(value)),
                    None => Err(error),
                }
            }
        }
    }

    /// Expire `key` without discarding its value: the next lookup
    /// recomputes, and concurrent callers can still be served the old value.
    pub async fn force_refresh(&self, key: &K) {
        let slots = self.slots.read().await;
        if let Some(slot) = slots.get(key) {
            let mut state = slot
                .state
                .lock()
                .expect("cache slot state should not be poisoned");
            state.computed_at = None;
        }
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }

    async fn slot(&self, key: &K) -> Arc<Slot<V>> {
        if let Some(slot) = self.slots.read().await.get(key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(key.clone()).or_insert_with(|| Arc::new(Slot::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn fresh_entry_is_served_without_recompute() {
        let cache: SingleFlightCache<&str, u32> = SingleFlightCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let response = cache
                .get_or_compute("key", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(7)
                })
                .await
                .expect("must succeed");
            assert_eq!(**response.value().expect("has value"), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entry_recomputes_once() {
        let cache: SingleFlightCache<&str, u32> = SingleFlightCache::new(Duration::from_millis(20));
        let calls = AtomicUsize::new(0);
        let compute = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(7)
        };

        cache.get_or_compute("key", compute).await.expect("first");
        tokio::time::sleep(Duration::from_millis(40)).await;
        let response = cache.get_or_compute("key", compute).await.expect("second");
        assert!(matches!(response, CacheResponse::Computed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_serves_stale_and_keeps_timestamp() {
        let cache: SingleFlightCache<&str, u32> = SingleFlightCache::new(Duration::from_millis(20));

        cache
            .get_or_compute("key", || async { Ok::<_, String>(7) })
            .await
            .expect("seed");
        tokio::time::sleep(Duration::from_millis(40)).await;

        let response = cache
            .get_or_compute("key", || async { Err::<u32, _>("boom".to_owned()) })
            .await
            .expect("stale fallback");
        assert!(matches!(response, CacheResponse::Stale(_)));
        assert_eq!(**response.value().expect("has value"), 7);

        // Still expired: the next caller computes again.
        let response = cache
            .get_or_compute("key", || async { Ok::<_, String>(9) })
            .await
            .expect("recompute");
        assert!(matches!(response, CacheResponse::Computed(_)));
    }

    #[tokio::test]
    async fn failure_with_no_previous_value_propagates() {
        let cache: SingleFlightCache<&str, u32> = SingleFlightCache::new(Duration::from_secs(60));
        let error = cache
            .get_or_compute("key", || async { Err::<u32, _>("boom".to_owned()) })
            .await
            .expect_err("must propagate");
        assert_eq!(error, "boom");

        // The failure did not poison the slot.
        let response = cache
            .get_or_compute("key", || async { Ok::<_, String>(7) })
            .await
            .expect("must succeed");
        assert!(matches!(response, CacheResponse::Computed(_)));
    }

    #[tokio::test]
    async fn force_refresh_expires_but_keeps_value() {
        let cache: SingleFlightCache<&str, u32> = SingleFlightCache::new(Duration::from_secs(60));
        cache
            .get_or_compute("key", || async { Ok::<_, String>(7) })
            .await
            .expect("seed");

        cache.force_refresh(&"key").await;

        let response = cache
            .get_or_compute("key", || async { Ok::<_, String>(9) })
            .await
            .expect("recompute");
        assert!(matches!(response, CacheResponse::Computed(_)));
        assert_eq!(**response.value().expect("has value"), 9);
    }
}
