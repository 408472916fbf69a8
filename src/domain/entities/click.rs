//! Click history entities.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Derived per-link rollup, updated atomically alongside each click insert.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Analytics {
    pub link_id: i64,
    pub clicks: i64,
    pub last_click: Option<DateTime<Utc>>,
}

/// One persisted click, as read back for analytics queries.
///
/// `ip_hash` is a salted digest; the raw visitor IP is never stored.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClickRow {
    pub clicked_at: DateTime<Utc>,
    pub ip_hash: String,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}
