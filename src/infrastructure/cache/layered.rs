//! Two-tier cache composing the local map with a shared backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::local_tier::LocalTier;
use super::service::{CacheResult, LinkCache};
use crate::domain::entities::ShortLink;

/// Local FIFO tier in front of a shared backend.
///
/// Reads consult the local tier first; on a miss the shared tier is asked
/// and a hit repopulates the local tier so hot codes settle in process
/// memory. Writes go to both tiers. Invalidation clears the local tier and
/// then the shared tier before returning, so no stale copy survives the
/// call in either.
pub struct TieredCache {
    local: LocalTier,
    shared: Arc<dyn LinkCache>,
}

impl TieredCache {
    pub fn new(
        local_capacity: usize,
        local_ttl: Duration,
        shared: Arc<dyn LinkCache>,
    ) -> Self {
        Self {
            local: LocalTier::new(local_capacity, local_ttl),
            shared,
        }
    }
}

#[async_trait]
impl LinkCache for TieredCache {
    async fn get(&self, code: &str) -> CacheResult<Option<ShortLink>> {
        if let Some(link) = self.local.get(code) {
            return Ok(Some(link));
        }

        match self.shared.get(code).await? {
            Some(link) => {
                self.local.set(code, &link);
                Ok(Some(link))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, code: &str, link: &ShortLink) -> CacheResult<()> {
        self.local.set(code, link);
        self.shared.set(code, link).await
    }

    async fn invalidate(&self, code: &str) -> CacheResult<()> {
        // Local first: a shared-tier failure must not leave a live local copy.
        self.local.invalidate(code);
        self.shared.invalidate(code).await
    }

    async fn health_check(&self) -> bool {
        self.shared.health_check().await
    }
}
