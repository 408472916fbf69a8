//! Sliding-window rate limiting over a shared timestamp store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

use crate::domain::repositories::BanRepository;
use crate::error::AppError;
use crate::infrastructure::ratelimit::RateLimitStore;

/// Authenticated identities get a higher tier.
const PRIVILEGED_MULTIPLIER: u32 = 5;

/// Outcome of one rate-limit check.
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// Sliding-window limiter: a per-identifier timestamp list in the shared
/// store, with stale entries discarded logically on read.
///
/// Banned identifiers are rejected unconditionally with `limit = 0`. When
/// the store is unreachable the limiter fails open - availability over
/// strict enforcement - and logs the degraded-mode event.
pub struct RateLimitService {
    store: Arc<dyn RateLimitStore>,
    bans: Arc<dyn BanRepository>,
    max_requests: u32,
    window: Duration,
}

impl RateLimitService {
    pub fn new(
        store: Arc<dyn RateLimitStore>,
        bans: Arc<dyn BanRepository>,
        max_requests: u32,
        window: Duration,
    ) -> Self {
        Self {
            store,
            bans,
            max_requests,
            window,
        }
    }

    /// Checks the identifier against its tier limit and, if allowed,
    /// consumes one slot.
    ///
    /// # Errors
    ///
    /// Propagates deny-list lookup failures; store failures fail open.
    pub async fn check_and_consume(
        &self,
        identifier: &str,
        is_privileged: bool,
    ) -> Result<RateLimitDecision, AppError> {
        let now = Utc::now();

        if self.bans.is_ip_banned(identifier).await? {
            return Ok(RateLimitDecision {
                allowed: false,
                limit: 0,
                remaining: 0,
                reset_at: now + self.window,
            });
        }

        let limit = if is_privileged {
            self.max_requests * PRIVILEGED_MULTIPLIER
        } else {
            self.max_requests
        };

        let now_ms = now.timestamp_millis();
        let window_ms = self.window.as_millis() as i64;
        let window_start = now_ms - window_ms;

        let hits = match self.store.hits(identifier).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "rate limit store unreachable, failing open");
                return Ok(RateLimitDecision {
                    allowed: true,
                    limit,
                    remaining: limit,
                    reset_at: now + self.window,
                });
            }
        };

        let valid: Vec<i64> = hits.into_iter().filter(|ts| *ts > window_start).collect();
        let count = valid.len() as u32;

        if count >= limit {
            // The oldest in-window hit leaving the window frees a slot.
            let oldest = valid.iter().min().copied().unwrap_or(now_ms);
            let reset_at = Utc
                .timestamp_millis_opt(oldest + window_ms)
                .single()
                .unwrap_or(now + self.window);
            return Ok(RateLimitDecision {
                allowed: false,
                limit,
                remaining: 0,
                reset_at,
            });
        }

        if let Err(e) = self
            .store
            .record_hit(identifier, now_ms, limit as usize, self.window)
            .await
        {
            warn!(error = %e, "rate limit store unreachable, failing open");
        }

        Ok(RateLimitDecision {
            allowed: true,
            limit,
            remaining: limit - count - 1,
            reset_at: now + self.window,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockBanRepository;
    use crate::infrastructure::ratelimit::{
        MemoryRateLimitStore, RateLimitStoreError,
    };
    use async_trait::async_trait;

    fn no_bans() -> Arc<MockBanRepository> {
        let mut bans = MockBanRepository::new();
        bans.expect_is_ip_banned().returning(|_| Ok(false));
        Arc::new(bans)
    }

    fn service(max: u32) -> RateLimitService {
        RateLimitService::new(
            Arc::new(MemoryRateLimitStore::new()),
            no_bans(),
            max,
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_allows_up_to_limit_then_denies() {
        let limiter = service(3);

        for _ in 0..3 {
            let decision = limiter.check_and_consume("1.2.3.4", false).await.unwrap();
            assert!(decision.allowed);
        }

        let decision = limiter.check_and_consume("1.2.3.4", false).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn test_privileged_tier_is_five_times_higher() {
        let limiter = service(2);

        for _ in 0..10 {
            let decision = limiter.check_and_consume("acct-1", true).await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.limit, 10);
        }

        let decision = limiter.check_and_consume("acct-1", true).await.unwrap();
        assert!(!decision.allowed);
    }

    #[tokio::test]
    async fn test_banned_identifier_rejected_with_zero_limit() {
        let mut bans = MockBanRepository::new();
        bans.expect_is_ip_banned().returning(|_| Ok(true));
        let limiter = RateLimitService::new(
            Arc::new(MemoryRateLimitStore::new()),
            Arc::new(bans),
            10,
            Duration::from_secs(60),
        );

        let decision = limiter.check_and_consume("6.6.6.6", false).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.limit, 0);
    }

    #[tokio::test]
    async fn test_remaining_counts_down() {
        let limiter = service(3);

        let first = limiter.check_and_consume("1.2.3.4", false).await.unwrap();
        assert_eq!(first.remaining, 2);
        let second = limiter.check_and_consume("1.2.3.4", false).await.unwrap();
        assert_eq!(second.remaining, 1);
    }

    struct BrokenStore;

    #[async_trait]
    impl RateLimitStore for BrokenStore {
        async fn hits(&self, _key: &str) -> Result<Vec<i64>, RateLimitStoreError> {
            Err(RateLimitStoreError("connection refused".to_string()))
        }

        async fn record_hit(
            &self,
            _key: &str,
            _timestamp_ms: i64,
            _keep: usize,
            _ttl: Duration,
        ) -> Result<(), RateLimitStoreError> {
            Err(RateLimitStoreError("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_fails_open() {
        let limiter = RateLimitService::new(
            Arc::new(BrokenStore),
            no_bans(),
            1,
            Duration::from_secs(60),
        );

        for _ in 0..5 {
            let decision = limiter.check_and_consume("1.2.3.4", false).await.unwrap();
            assert!(decision.allowed);
        }
    }
}
