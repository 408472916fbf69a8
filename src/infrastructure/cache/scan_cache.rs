//! Cache for aggregate validation results, keyed by content hash.

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::warn;

use crate::domain::entities::ValidationResult;

/// Day-long cache of validation verdicts. A hit short-circuits the whole
/// scanner chain. Fail-open on both sides: errors read as misses and writes
/// are best-effort.
#[async_trait]
pub trait ScanCache: Send + Sync {
    async fn get(&self, content_hash: &str) -> Option<ValidationResult>;
    async fn set(&self, content_hash: &str, result: &ValidationResult);
}

/// Redis-backed scan cache under `scan:<hash>` keys.
pub struct RedisScanCache {
    client: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisScanCache {
    pub fn new(client: ConnectionManager, ttl_seconds: u64) -> Self {
        Self {
            client,
            ttl_seconds,
        }
    }

    fn build_key(content_hash: &str) -> String {
        format!("scan:{}", content_hash)
    }
}

#[async_trait]
impl ScanCache for RedisScanCache {
    async fn get(&self, content_hash: &str) -> Option<ValidationResult> {
        let mut conn = self.client.clone();
        match conn
            .get::<_, Option<String>>(Self::build_key(content_hash))
            .await
        {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "scan cache read failed");
                None
            }
        }
    }

    async fn set(&self, content_hash: &str, result: &ValidationResult) {
        let Ok(raw) = serde_json::to_string(result) else {
            return;
        };
        let mut conn = self.client.clone();
        if let Err(e) = conn
            .set_ex::<_, _, ()>(Self::build_key(content_hash), raw, self.ttl_seconds)
            .await
        {
            warn!(error = %e, "scan cache write failed");
        }
    }
}

/// No-op scan cache for cache-less deployments; every validation runs the
/// full chain.
pub struct NullScanCache;

#[async_trait]
impl ScanCache for NullScanCache {
    async fn get(&self, _content_hash: &str) -> Option<ValidationResult> {
        None
    }

    async fn set(&self, _content_hash: &str, _result: &ValidationResult) {}
}
