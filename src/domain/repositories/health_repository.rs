//! Repository trait for destination health-check history.

use crate::domain::entities::{HealthCheck, HealthStatus, NewHealthCheck};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the append-only probe log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthRepository: Send + Sync {
    /// Appends one probe record.
    async fn record(&self, check: NewHealthCheck) -> Result<(), AppError>;

    /// Statuses of the most recent probes for a link, newest first. Drives
    /// the consecutive-failure auto-flag decision.
    async fn recent_statuses(&self, link_id: i64, limit: i64)
    -> Result<Vec<HealthStatus>, AppError>;

    /// Probe history for a link, newest first.
    async fn history(&self, link_id: i64, limit: i64) -> Result<Vec<HealthCheck>, AppError>;
}
