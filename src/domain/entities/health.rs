//! Destination health entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classified outcome of one destination probe.
///
/// 2xx/3xx map to `Healthy`; 429, 503, and timeouts map to `Warning`
/// (transient pressure, not brokenness); everything else is `Broken`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "health_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Broken,
}

/// Immutable record of one destination probe.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HealthCheck {
    pub id: i64,
    pub link_id: i64,
    pub status: HealthStatus,
    pub status_code: Option<i32>,
    pub response_time_ms: Option<i32>,
    pub error_message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Input data for a new probe record.
#[derive(Debug, Clone)]
pub struct NewHealthCheck {
    pub link_id: i64,
    pub status: HealthStatus,
    pub status_code: Option<i32>,
    pub response_time_ms: Option<i32>,
    pub error_message: Option<String>,
}
