//! L2 durable key/value cache: the backing store for `CacheKey → ResultList`
//! entries that must survive process restarts.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use thiserror::Error;

/// Errors returned by the L2 key/value store.
#[derive(Debug, Error)]
pub enum KvCacheError {
    /// The backing store could not be reached.
    #[error("KV cache unavailable: {0}")]
    Unavailable(String),

    /// A stored value was not valid UTF-8/JSON for its expected shape.
    #[error("KV cache value corrupt for key '{key}': {reason}")]
    Corrupt {
        /// Offending key.
        key: String,
        /// Decode failure reason.
        reason: String,
    },
}

/// Durable string-keyed byte store backing the L2 cache. Values are
/// JSON-encoded result lists (`serde_json` arrays of strings); this trait
/// deals only in raw bytes, leaving encoding to the pipeline.
#[async_trait]
pub trait KVCache: Send + Sync {
    /// Fetches the raw value for `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvCacheError>;

    /// Stores `value` under `key`, overwriting any existing entry.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), KvCacheError>;

    /// Batched form of [`KVCache::get`]; one result per input key, in order.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, KvCacheError>;

    /// Lists keys matching a store-native glob `pattern`.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, KvCacheError>;

    /// Removes every key from the store.
    async fn flush(&self) -> Result<(), KvCacheError>;
}

/// Redis-backed [`KVCache`], reached via [`redis::Client`] with an
/// auto-reconnecting [`ConnectionManager`].
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Connects to `redis_url`, establishing the connection manager used for
    /// every subsequent operation.
    pub async fn connect(redis_url: &str) -> Result<Self, KvCacheError> {
        let client =
            redis::Client::open(redis_url).map_err(|e| KvCacheError::Unavailable(e.to_string()))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| KvCacheError::Unavailable(e.to_string()))?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl KVCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvCacheError> {
        let mut conn = self.manager.clone();
        conn.get(key)
            .await
            .map_err(|e| KvCacheError::Unavailable(e.to_string()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), KvCacheError> {
        let mut conn = self.manager.clone();
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| KvCacheError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, KvCacheError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.manager.clone();
        conn.mget(keys)
            .await
            .map_err(|e| KvCacheError::Unavailable(e.to_string()))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, KvCacheError> {
        let mut conn = self.manager.clone();
        conn.keys(pattern)
            .await
            .map_err(|e| KvCacheError::Unavailable(e.to_string()))
    }

    async fn flush(&self) -> Result<(), KvCacheError> {
        let mut conn = self.manager.clone();
        redis::cmd("FLUSHDB")
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| KvCacheError::Unavailable(e.to_string()))
    }
}

/// In-memory [`KVCache`] used by tests and the `mock` feature, standing in
/// for Redis without a live connection.
#[cfg(any(test, feature = "mock"))]
#[derive(Clone, Default)]
pub struct MockKVCache {
    store: std::sync::Arc<parking_lot::Mutex<std::collections::HashMap<String, Vec<u8>>>>,
}

#[cfg(any(test, feature = "mock"))]
impl MockKVCache {
    /// Creates an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl KVCache for MockKVCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvCacheError> {
        Ok(self.store.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), KvCacheError> {
        self.store.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, KvCacheError> {
        let store = self.store.lock();
        Ok(keys.iter().map(|k| store.get(k).cloned()).collect())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, KvCacheError> {
        // Only the `*` wildcard is needed by callers (admin "list everything").
        let store = self.store.lock();
        if pattern == "*" {
            Ok(store.keys().cloned().collect())
        } else {
            Ok(store
                .keys()
                .filter(|k| k.as_str() == pattern)
                .cloned()
                .collect())
        }
    }

    async fn flush(&self) -> Result<(), KvCacheError> {
        self.store.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_round_trips_values() {
        let cache = MockKVCache::new();
        assert_eq!(cache.get("fox::5").await.unwrap(), None);
        cache
            .set("fox::5", br#"["a","b"]"#.to_vec())
            .await
            .unwrap();
        assert_eq!(
            cache.get("fox::5").await.unwrap(),
            Some(br#"["a","b"]"#.to_vec())
        );
    }

    #[tokio::test]
    async fn mock_flush_empties_store() {
        let cache = MockKVCache::new();
        cache.set("a", b"1".to_vec()).await.unwrap();
        cache.flush().await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn mock_mget_preserves_order_and_misses() {
        let cache = MockKVCache::new();
        cache.set("a", b"1".to_vec()).await.unwrap();
        let got = cache
            .mget(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(got, vec![Some(b"1".to_vec()), None]);
    }
}
