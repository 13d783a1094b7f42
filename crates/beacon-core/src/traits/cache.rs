//! Cache provider trait for pluggable caching backends.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::result::AppResult;

/// Trait for cache backends (Redis or in-memory).
///
/// All values are serialized as strings (JSON). Implementations must be safe
/// for concurrent use and must never return an entry past its TTL.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Set a value with the default TTL.
    async fn set_default(&self, key: &str, value: &str) -> AppResult<()>;

    /// Delete a key from the cache. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Get a typed value by deserializing from JSON.
pub async fn get_json<T: DeserializeOwned>(
    cache: &dyn CacheProvider,
    key: &str,
) -> AppResult<Option<T>> {
    match cache.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_str(&value)?)),
        None => Ok(None),
    }
}

/// Set a typed value by serializing to JSON.
pub async fn set_json<T: Serialize + ?Sized>(
    cache: &dyn CacheProvider,
    key: &str,
    value: &T,
    ttl: Duration,
) -> AppResult<()> {
    let json = serde_json::to_string(value)?;
    cache.set(key, &json, ttl).await
}
