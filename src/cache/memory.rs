//! In-process cache backends.

use super::{CacheError, CacheStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// A TTL map guarded by a tokio `RwLock`. Expired entries read as misses and
/// stay in memory until the next [`InMemoryCacheStore::purge_expired`].
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops expired entries and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before - entries.len())
    }
}

/// Cache that never stores anything. Every read is a miss.
pub struct NoOpCacheStore;

#[async_trait]
impl CacheStore for NoOpCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete_by_prefix(&self, _prefix: &str) -> Result<usize, CacheError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn set_then_get() {
        let cache = InMemoryCacheStore::new();
        cache.set("album:1", "v".to_string(), TTL).await.unwrap();
        assert_eq!(cache.get("album:1").await.unwrap(), Some("v".to_string()));
        assert_eq!(cache.get("album:2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_single_key() {
        let cache = InMemoryCacheStore::new();
        cache.set("a", "1".to_string(), TTL).await.unwrap();
        cache.set("b", "2".to_string(), TTL).await.unwrap();
        cache.delete("a").await.unwrap();
        cache.delete("missing").await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert_eq!(cache.get("b").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn delete_by_prefix_leaves_other_keys() {
        let cache = InMemoryCacheStore::new();
        cache.set("playlist:songs:1", "x".to_string(), TTL).await.unwrap();
        cache.set("playlist:songs:2", "y".to_string(), TTL).await.unwrap();
        cache.set("album:1", "z".to_string(), TTL).await.unwrap();

        assert_eq!(cache.delete_by_prefix("playlist:songs:").await.unwrap(), 2);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("album:1").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = InMemoryCacheStore::new();
        cache
            .set("k", "v".to_string(), Duration::from_secs(5))
            .await
            .unwrap();
        cache
            .set("long", "v".to_string(), Duration::from_secs(50))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(cache.len().await, 2);

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn noop_always_misses() {
        let cache = NoOpCacheStore;
        cache.set("k", "v".to_string(), TTL).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(cache.delete_by_prefix("k").await.unwrap(), 0);
    }
}
