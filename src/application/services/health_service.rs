//! Destination health monitoring.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::application::services::ShortenerService;
use crate::domain::entities::{HealthStatus, NewHealthCheck, ShortLink};
use crate::domain::repositories::{HealthRepository, LinkRepository, RotationRepository};
use crate::error::AppError;
use crate::infrastructure::health::DestinationProber;

/// Consecutive broken probes before a link is auto-flagged.
const BROKEN_STREAK: i64 = 3;
/// Probes issued concurrently per sub-batch.
const SUB_BATCH_SIZE: usize = 10;
/// Pause between sub-batches, bounding outbound request pressure.
const SUB_BATCH_PACING: Duration = Duration::from_secs(1);

const BROKEN_FLAG_REASON: &str = "Link destination appears to be broken";

/// Probes link destinations, keeps the immutable check log, and auto-flags
/// links that stay broken.
pub struct HealthService {
    links: Arc<dyn LinkRepository>,
    rotations: Arc<dyn RotationRepository>,
    checks: Arc<dyn HealthRepository>,
    prober: Arc<dyn DestinationProber>,
    shortener: Arc<ShortenerService>,
}

impl HealthService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        rotations: Arc<dyn RotationRepository>,
        checks: Arc<dyn HealthRepository>,
        prober: Arc<dyn DestinationProber>,
        shortener: Arc<ShortenerService>,
    ) -> Self {
        Self {
            links,
            rotations,
            checks,
            prober,
            shortener,
        }
    }

    /// Probes one link's effective destination and records the outcome.
    ///
    /// Rotation links are probed against their first active destination.
    /// Three consecutive `BROKEN` results auto-flag the link with a reason
    /// distinct from abuse flags.
    pub async fn check_one(&self, link: &ShortLink) -> Result<HealthStatus, AppError> {
        let target = self.effective_destination(link).await?;
        let outcome = self.prober.probe(&target).await;

        self.checks
            .record(NewHealthCheck {
                link_id: link.id,
                status: outcome.status,
                status_code: outcome.status_code,
                response_time_ms: Some(outcome.response_time_ms),
                error_message: outcome.error_message.clone(),
            })
            .await?;

        self.links
            .update_health(
                link.id,
                outcome.status,
                outcome.status_code,
                outcome.error_message.clone(),
            )
            .await?;

        if outcome.status == HealthStatus::Broken && !link.is_flagged {
            let recent = self.checks.recent_statuses(link.id, BROKEN_STREAK).await?;
            if recent.len() as i64 == BROKEN_STREAK
                && recent.iter().all(|s| *s == HealthStatus::Broken)
            {
                self.shortener.flag(link, BROKEN_FLAG_REASON).await?;
                info!(short_code = %link.short_code, "link auto-flagged after consecutive broken probes");
            }
        }

        Ok(outcome.status)
    }

    /// Probes every active, unflagged link not checked since `stale_before`,
    /// oldest first, in paced concurrent sub-batches.
    pub async fn run_batch(
        self: &Arc<Self>,
        stale_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<usize, AppError> {
        let stale = self.links.stale_for_health_check(stale_before, limit).await?;
        let total = stale.len();
        if total == 0 {
            return Ok(0);
        }

        info!(total, "health sweep starting");
        let mut batches = stale.chunks(SUB_BATCH_SIZE).peekable();
        while let Some(batch) = batches.next() {
            let mut tasks = JoinSet::new();
            for link in batch {
                let service = Arc::clone(self);
                let link = link.clone();
                tasks.spawn(async move {
                    if let Err(e) = service.check_one(&link).await {
                        warn!(short_code = %link.short_code, error = %e, "health check failed");
                    }
                });
            }
            while tasks.join_next().await.is_some() {}

            if batches.peek().is_some() {
                tokio::time::sleep(SUB_BATCH_PACING).await;
            }
        }

        Ok(total)
    }

    /// Probe history for one link, newest first.
    pub async fn history(
        &self,
        link_id: i64,
        limit: i64,
    ) -> Result<Vec<crate::domain::entities::HealthCheck>, AppError> {
        self.checks.history(link_id, limit).await
    }

    async fn effective_destination(&self, link: &ShortLink) -> Result<String, AppError> {
        if link.is_rotation {
            let destinations = self.rotations.list_active(link.id).await?;
            if let Some(first) = destinations.into_iter().next() {
                return Ok(first.destination);
            }
        }
        Ok(link.original_url.clone())
    }
}
