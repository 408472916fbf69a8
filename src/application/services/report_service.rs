//! Abuse report intake and the auto-flag threshold.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::application::services::ShortenerService;
use crate::domain::entities::{Report, ReportStatus, ShortLink};
use crate::domain::repositories::ReportRepository;
use crate::error::AppError;

/// Accepts abuse reports and flags links once enough distinct reporters
/// agree.
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    shortener: Arc<ShortenerService>,
    auto_flag_threshold: i64,
}

impl ReportService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        shortener: Arc<ShortenerService>,
        auto_flag_threshold: i64,
    ) -> Self {
        Self {
            reports,
            shortener,
            auto_flag_threshold,
        }
    }

    /// Files a report. One report per reporter per link; reaching the
    /// threshold flags the link (and invalidates its cache entry).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] on a duplicate report.
    pub async fn submit(
        &self,
        link: &ShortLink,
        reported_by: &str,
        reason: &str,
    ) -> Result<Report, AppError> {
        if self.reports.exists(link.id, reported_by).await? {
            return Err(AppError::conflict(
                "You have already reported this link",
                json!({ "short_code": link.short_code }),
            ));
        }

        let report = self.reports.create(link.id, reported_by, reason).await?;

        let total = self.reports.count_for_link(link.id).await?;
        if total >= self.auto_flag_threshold && !link.is_flagged {
            self.shortener
                .flag(link, "Multiple abuse reports received")
                .await?;
            info!(short_code = %link.short_code, total, "link auto-flagged by report threshold");
        }

        Ok(report)
    }

    pub async fn list_pending(&self, limit: i64) -> Result<Vec<Report>, AppError> {
        self.reports.list_pending(limit).await
    }

    /// Resolves a report as reviewed or dismissed.
    pub async fn resolve(&self, report_id: i64, status: ReportStatus) -> Result<(), AppError> {
        if status == ReportStatus::Pending {
            return Err(AppError::bad_request(
                "Reports can only be resolved to a terminal status",
                json!({}),
            ));
        }
        if !self.reports.resolve(report_id, status).await? {
            return Err(AppError::not_found(
                "Report not found",
                json!({ "id": report_id }),
            ));
        }
        Ok(())
    }

    pub async fn count_pending(&self) -> Result<i64, AppError> {
        self.reports.count_pending().await
    }
}
