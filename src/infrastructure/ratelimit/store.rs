//! Timestamp-list storage backing the sliding-window rate limiter.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

#[derive(Debug, thiserror::Error)]
#[error("rate limit store error: {0}")]
pub struct RateLimitStoreError(pub String);

/// Per-key hit history for the sliding-window limiter.
///
/// Stores millisecond timestamps, newest first. The window arithmetic lives
/// in the application service; the store only appends and reads. Backend
/// failures surface as errors so the service can decide to fail open.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Returns recorded hit timestamps for the key, newest first.
    async fn hits(&self, key: &str) -> Result<Vec<i64>, RateLimitStoreError>;

    /// Records a hit, trims the history to `keep` entries, and refreshes
    /// the key's expiry so idle histories disappear on their own.
    async fn record_hit(
        &self,
        key: &str,
        timestamp_ms: i64,
        keep: usize,
        ttl: Duration,
    ) -> Result<(), RateLimitStoreError>;
}

/// Redis list per key: LPUSH new hits, LTRIM to the retention bound,
/// EXPIRE on every write.
pub struct RedisRateLimitStore {
    client: ConnectionManager,
}

impl RedisRateLimitStore {
    pub fn new(client: ConnectionManager) -> Self {
        Self { client }
    }

    fn build_key(key: &str) -> String {
        format!("ratelimit:{}", key)
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn hits(&self, key: &str) -> Result<Vec<i64>, RateLimitStoreError> {
        let mut conn = self.client.clone();
        let raw: Vec<String> = conn
            .lrange(Self::build_key(key), 0, -1)
            .await
            .map_err(|e| RateLimitStoreError(e.to_string()))?;

        Ok(raw.iter().filter_map(|s| s.parse::<i64>().ok()).collect())
    }

    async fn record_hit(
        &self,
        key: &str,
        timestamp_ms: i64,
        keep: usize,
        ttl: Duration,
    ) -> Result<(), RateLimitStoreError> {
        let key = Self::build_key(key);
        let mut conn = self.client.clone();

        let mut pipe = redis::pipe();
        pipe.lpush(&key, timestamp_ms)
            .ignore()
            .ltrim(&key, 0, keep.saturating_sub(1) as isize)
            .ignore()
            .expire(&key, ttl.as_secs() as i64)
            .ignore();

        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(|e| RateLimitStoreError(e.to_string()))?;
        Ok(())
    }
}

/// In-memory store for tests and single-instance deployments.
#[derive(Default)]
pub struct MemoryRateLimitStore {
    entries: Mutex<HashMap<String, Vec<i64>>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn hits(&self, key: &str) -> Result<Vec<i64>, RateLimitStoreError> {
        Ok(self
            .entries
            .lock()
            .expect("rate limit store mutex poisoned")
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn record_hit(
        &self,
        key: &str,
        timestamp_ms: i64,
        keep: usize,
        _ttl: Duration,
    ) -> Result<(), RateLimitStoreError> {
        let mut entries = self.entries.lock().expect("rate limit store mutex poisoned");
        let history = entries.entry(key.to_string()).or_default();
        history.insert(0, timestamp_ms);
        history.truncate(keep);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_keeps_newest_first() {
        let store = MemoryRateLimitStore::new();
        for ts in [100, 200, 300] {
            store
                .record_hit("k", ts, 10, Duration::from_secs(60))
                .await
                .unwrap();
        }
        assert_eq!(store.hits("k").await.unwrap(), vec![300, 200, 100]);
    }

    #[tokio::test]
    async fn test_memory_store_trims_to_keep() {
        let store = MemoryRateLimitStore::new();
        for ts in 0..5 {
            store
                .record_hit("k", ts, 3, Duration::from_secs(60))
                .await
                .unwrap();
        }
        assert_eq!(store.hits("k").await.unwrap().len(), 3);
        assert_eq!(store.hits("k").await.unwrap()[0], 4);
    }

    #[tokio::test]
    async fn test_memory_store_isolates_keys() {
        let store = MemoryRateLimitStore::new();
        store
            .record_hit("a", 1, 10, Duration::from_secs(60))
            .await
            .unwrap();
        assert!(store.hits("b").await.unwrap().is_empty());
    }
}
