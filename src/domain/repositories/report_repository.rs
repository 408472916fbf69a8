//! Repository trait for abuse reports.

use crate::domain::entities::{Report, ReportStatus};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the abuse report queue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// True when this reporter already reported this link.
    async fn exists(&self, link_id: i64, reported_by: &str) -> Result<bool, AppError>;

    async fn create(&self, link_id: i64, reported_by: &str, reason: &str)
    -> Result<Report, AppError>;

    /// Total reports filed against a link (drives the auto-flag threshold).
    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError>;

    /// Pending reports, oldest first.
    async fn list_pending(&self, limit: i64) -> Result<Vec<Report>, AppError>;

    /// Moves a report out of the pending queue. Returns false if absent.
    async fn resolve(&self, report_id: i64, status: ReportStatus) -> Result<bool, AppError>;

    async fn count_pending(&self) -> Result<i64, AppError>;
}
