//! Per-link analytics and the admin overview.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entities::{Analytics, ClickRow, ScanRecord};
use crate::domain::repositories::{
    ClickRepository, LinkRepository, ReportRepository, ScanRepository,
};
use crate::error::AppError;

/// Everything the owner dashboard shows for one link.
#[derive(Debug, Serialize)]
pub struct LinkStats {
    pub analytics: Option<Analytics>,
    pub recent_clicks: Vec<ClickRow>,
    pub scans: Vec<ScanRecord>,
}

/// System-wide counters for the admin dashboard.
#[derive(Debug, Serialize)]
pub struct AdminOverview {
    pub active_links: i64,
    pub flagged_links: i64,
    pub total_clicks: i64,
    pub pending_reports: i64,
}

pub struct StatsService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
    scans: Arc<dyn ScanRepository>,
    reports: Arc<dyn ReportRepository>,
}

impl StatsService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        clicks: Arc<dyn ClickRepository>,
        scans: Arc<dyn ScanRepository>,
        reports: Arc<dyn ReportRepository>,
    ) -> Self {
        Self {
            links,
            clicks,
            scans,
            reports,
        }
    }

    pub async fn link_stats(&self, link_id: i64, recent_limit: i64) -> Result<LinkStats, AppError> {
        let analytics = self.clicks.analytics(link_id).await?;
        let recent_clicks = self.clicks.recent(link_id, recent_limit).await?;
        let scans = self.scans.list_for_link(link_id).await?;

        Ok(LinkStats {
            analytics,
            recent_clicks,
            scans,
        })
    }

    pub async fn admin_overview(&self) -> Result<AdminOverview, AppError> {
        let (active_links, flagged_links) = self.links.admin_counts().await?;
        let total_clicks = self.clicks.total_clicks().await?;
        let pending_reports = self.reports.count_pending().await?;

        Ok(AdminOverview {
            active_links,
            flagged_links,
            total_clicks,
            pending_reports,
        })
    }
}
