//! DTOs for the admin moderation surface.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{BannedDomain, BannedIp, Report, ReportStatus};

#[derive(Debug, Deserialize, Validate)]
pub struct FlagRequest {
    #[validate(length(min = 3, max = 500))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BanIpRequest {
    #[validate(length(min = 1, max = 64))]
    pub ip: String,

    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BanDomainRequest {
    #[validate(length(min = 1, max = 255))]
    pub domain: String,

    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveReportRequest {
    pub status: ReportStatus,
}

#[derive(Debug, Serialize)]
pub struct PendingReportsResponse {
    pub reports: Vec<Report>,
}

#[derive(Debug, Serialize)]
pub struct BanListResponse {
    pub ips: Vec<BannedIp>,
    pub domains: Vec<BannedDomain>,
}
