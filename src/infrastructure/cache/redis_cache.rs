//! Redis-backed shared cache tier.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

use super::service::{CacheError, CacheResult, LinkCache};
use crate::domain::entities::ShortLink;

/// Redis cache holding serialized link records under `url:<code>` keys.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection
/// reuse. Reads and writes are fail-open: errors are logged and surface as
/// misses or no-ops. Only [`LinkCache::invalidate`] propagates failure,
/// because a missed invalidation would let a flagged or deleted link keep
/// resolving until TTL expiry.
pub struct RedisCache {
    client: ConnectionManager,
    ttl_seconds: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and
    /// configures the entry TTL.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            ttl_seconds,
            key_prefix: "url:".to_string(),
        })
    }

    fn build_key(&self, code: &str) -> String {
        format!("{}{}", self.key_prefix, code)
    }
}

#[async_trait]
impl LinkCache for RedisCache {
    async fn get(&self, code: &str) -> CacheResult<Option<ShortLink>> {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<ShortLink>(&raw) {
                Ok(link) => {
                    debug!(%code, "shared cache hit");
                    Ok(Some(link))
                }
                Err(e) => {
                    warn!(%code, error = %e, "dropping undecodable cache entry");
                    let _ = conn.del::<_, i32>(&key).await;
                    Ok(None)
                }
            },
            Ok(None) => Ok(None),
            Err(e) => {
                error!(%code, error = %e, "Redis GET failed");
                Ok(None)
            }
        }
    }

    async fn set(&self, code: &str, link: &ShortLink) -> CacheResult<()> {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        let raw = serde_json::to_string(link)
            .map_err(|e| CacheError::OperationError(e.to_string()))?;

        if let Err(e) = conn.set_ex::<_, _, ()>(&key, raw, self.ttl_seconds).await {
            warn!(%code, error = %e, "Redis SET failed");
        }
        Ok(())
    }

    async fn invalidate(&self, code: &str) -> CacheResult<()> {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        conn.del::<_, i32>(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("Redis DEL failed: {}", e)))?;
        debug!(%code, "shared cache invalidated");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
