use super::{keys, CacheError, CacheStore, Cached, NoOpCacheStore};
use crate::error::CatalogResult;
use crate::server::metrics;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache-aside helper shared by the services.
///
/// Backend failures never leave this type: they are logged, counted, and
/// turned into misses (reads) or no-ops (writes and invalidations).
#[derive(Clone)]
pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        CacheLayer { store, ttl }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NoOpCacheStore), Duration::ZERO)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key`, or runs `load` against the store
    /// and caches its result. Errors from `load` are returned as-is and
    /// nothing is cached for them.
    pub async fn get_or_load<T, F>(&self, key: &str, load: F) -> CatalogResult<Cached<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> CatalogResult<T>,
    {
        let namespace = keys::namespace(key);
        match self.lookup::<T>(key).await {
            Ok(Some(value)) => {
                metrics::record_cache_lookup(namespace, "hit");
                debug!("Cache hit for {}", key);
                return Ok(Cached::from_cache(value));
            }
            Ok(None) => {
                metrics::record_cache_lookup(namespace, "miss");
                debug!("Cache miss for {}", key);
            }
            Err(err) => {
                metrics::record_cache_lookup(namespace, "error");
                warn!("Cache read of {} failed, reading from store: {}", key, err);
            }
        }

        let value = load()?;
        if let Err(err) = self.put(key, &value).await {
            metrics::record_cache_lookup(namespace, "error");
            warn!("Failed to populate cache key {}: {}", key, err);
        }
        Ok(Cached::from_store(value))
    }

    /// Removes `keys` from the cache. Must be called after the store write it
    /// follows has succeeded.
    pub async fn invalidate<I, K>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            let key = key.as_ref();
            metrics::record_cache_invalidation("key");
            if let Err(err) = self.store.delete(key).await {
                warn!("Failed to invalidate cache key {}: {}", key, err);
            } else {
                debug!("Invalidated cache key {}", key);
            }
        }
    }

    pub async fn invalidate_prefix(&self, prefix: &str) {
        metrics::record_cache_invalidation("prefix");
        match self.store.delete_by_prefix(prefix).await {
            Ok(removed) => debug!("Invalidated {} cache keys under {}", removed, prefix),
            Err(err) => warn!("Failed to invalidate cache prefix {}: {}", prefix, err),
        }
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, raw, self.ttl).await
    }
}
