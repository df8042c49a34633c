//! Read-through cache in front of the catalog store.
//!
//! Backends only see opaque string values; [`CacheLayer`] handles
//! serialization, TTLs, metrics and the "log and fall back" failure policy.

pub mod keys;
mod layer;
mod memory;
mod sweeper;

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub use layer::CacheLayer;
pub use memory::{InMemoryCacheStore, NoOpCacheStore};
pub use sweeper::run_cache_sweeper;

/// Default time-to-live of cache entries, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 1800;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Cache value serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns Ok(None) on a miss, including for expired entries.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Returns the number of removed entries.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, CacheError>;
}

/// Where a value handed out by the cache layer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Cache,
    Store,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub source: DataSource,
}

impl<T> Cached<T> {
    pub fn from_cache(value: T) -> Self {
        Cached {
            value,
            source: DataSource::Cache,
        }
    }

    pub fn from_store(value: T) -> Self {
        Cached {
            value,
            source: DataSource::Store,
        }
    }

    pub fn is_from_cache(&self) -> bool {
        self.source == DataSource::Cache
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Cached<U> {
        Cached {
            value: f(self.value),
            source: self.source,
        }
    }
}
