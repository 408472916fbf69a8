//! Abuse report entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    Pending,
    Reviewed,
    Dismissed,
}

/// A visitor or account reporting a short link as abusive.
///
/// `reported_by` is the account id when authenticated, otherwise the hashed
/// client IP; one report per reporter per link (duplicates are a conflict).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Report {
    pub id: i64,
    pub link_id: i64,
    pub reported_by: String,
    pub reason: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}
