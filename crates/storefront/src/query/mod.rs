//! Keyed, invalidatable cache of asynchronous fetch results.
//!
//! Backed by `moka`'s future cache, which gives the three guarantees the
//! storefront relies on:
//!
//! - concurrent callers for one key share one in-flight request
//!   (de-duplication, via `try_get_with`)
//! - a successful fetch is memoized until invalidated (the TTL is only a
//!   staleness backstop)
//! - a failed fetch is NOT memoized and is retried on the next access
//!
//! On top of that, keys can declare **dependents**: invalidating a key
//! transitively invalidates every query derived from it, so a cart refetch
//! also drops the cart-with-products join.

mod keys;

pub use keys::{CacheValue, QueryKey};

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::api::ApiError;

const MAX_ENTRIES: u64 = 1000;
const TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Invalidatable cache of query results, keyed by [`QueryKey`].
pub struct QueryCache {
    entries: Cache<QueryKey, CacheValue>,
    dependents: Mutex<HashMap<QueryKey, HashSet<QueryKey>>>,
}

impl QueryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(TTL)
                .build(),
            dependents: Mutex::new(HashMap::new()),
        }
    }

    /// Read through the cache.
    ///
    /// On a miss, `init` is polled to fetch the value; concurrent callers for
    /// the same key await that one fetch instead of issuing their own.
    ///
    /// # Errors
    ///
    /// Returns the fetch error. Errors are not cached.
    pub async fn fetch(
        &self,
        key: QueryKey,
        init: impl Future<Output = Result<CacheValue, ApiError>>,
    ) -> Result<CacheValue, ApiError> {
        self.entries
            .try_get_with(key, init)
            .await
            .map_err(|e| (*e).clone())
    }

    /// Declare that `dependent` is derived from `upstream` and must be
    /// re-fetched whenever `upstream` is invalidated.
    pub fn register_dependent(&self, upstream: QueryKey, dependent: QueryKey) {
        // The map stays consistent even if a holder panicked; recover the
        // guard rather than dropping the registration
        let mut map = self
            .dependents
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        map.entry(upstream).or_default().insert(dependent);
    }

    /// Mark a key stale, along with everything derived from it.
    ///
    /// The next read for each invalidated key triggers a fresh fetch.
    pub async fn invalidate(&self, key: &QueryKey) {
        self.invalidate_keys(self.transitive_closure(key)).await;
    }

    /// Mark everything derived from `key` stale, leaving `key` itself cached.
    ///
    /// Used when the base query was just freshly fetched: the base entry is
    /// current, but joins computed from its previous value are not.
    pub async fn invalidate_dependents(&self, key: &QueryKey) {
        let mut keys = self.transitive_closure(key);
        keys.retain(|k| k != key);
        self.invalidate_keys(keys).await;
    }

    /// The key plus every key reachable through the dependents map.
    fn transitive_closure(&self, key: &QueryKey) -> Vec<QueryKey> {
        let map = self
            .dependents
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut queue = vec![key.clone()];
        let mut seen = HashSet::new();
        let mut closure = Vec::new();

        while let Some(key) = queue.pop() {
            if !seen.insert(key.clone()) {
                continue;
            }
            if let Some(children) = map.get(&key) {
                queue.extend(children.iter().cloned());
            }
            closure.push(key);
        }
        closure
    }

    async fn invalidate_keys(&self, keys: Vec<QueryKey>) {
        for key in keys {
            debug!(?key, "invalidating cache entry");
            self.entries.invalidate(&key).await;
        }
        // Invalidation must be visible to reads issued right after this call
        self.entries.run_pending_tasks().await;
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
