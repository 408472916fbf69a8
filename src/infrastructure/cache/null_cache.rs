//! No-op cache for deployments without Redis.

use async_trait::async_trait;

use super::service::{CacheResult, LinkCache};
use crate::domain::entities::ShortLink;

/// Cache implementation that stores nothing. Every read is a miss.
pub struct NullCache;

#[async_trait]
impl LinkCache for NullCache {
    async fn get(&self, _code: &str) -> CacheResult<Option<ShortLink>> {
        Ok(None)
    }

    async fn set(&self, _code: &str, _link: &ShortLink) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
