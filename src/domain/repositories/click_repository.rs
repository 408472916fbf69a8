//! Repository trait for click history and analytics rollups.

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{Analytics, ClickRow};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the append-only click log and its rollup.
///
/// [`ClickRepository::record`] inserts the event and bumps the analytics
/// counter in one transaction, so the rollup never drifts from the log by
/// more than in-flight work.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Persists one click event and atomically increments the link's
    /// analytics counter. Looks the link up by short code; unknown codes are
    /// dropped silently (the link may have been deleted mid-flight).
    async fn record(&self, event: ClickEvent) -> Result<(), AppError>;

    /// Analytics rollup for a link, if any clicks were ever recorded.
    async fn analytics(&self, link_id: i64) -> Result<Option<Analytics>, AppError>;

    /// Most recent click rows for a link.
    async fn recent(&self, link_id: i64, limit: i64) -> Result<Vec<ClickRow>, AppError>;

    /// Deletes click events older than the cutoff. Retention sweep.
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;

    /// Sum of all click counters (admin stats).
    async fn total_clicks(&self) -> Result<i64, AppError>;
}
