//! DTOs for resolution-adjacent endpoints: preview, password gate, analytics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::LinkStats;
use crate::domain::entities::{HealthCheck, HealthStatus, ShortLink};

/// Metadata served to social-bot and explicit-preview requests in place of
/// a redirect.
///
/// `destination` is absent while a password gate is locked; the preview
/// would otherwise hand out exactly what the gate protects.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_rotation: bool,
    pub is_password_protected: bool,
    pub health_status: Option<HealthStatus>,
}

impl PreviewResponse {
    pub fn from_link(link: &ShortLink, unlocked: bool) -> Self {
        Self {
            code: link.short_code.clone(),
            destination: unlocked.then(|| link.original_url.clone()),
            created_at: link.created_at,
            expires_at: link.expires_at,
            is_rotation: link.is_rotation,
            is_password_protected: link.is_password_protected,
            health_status: link.health_status,
        }
    }
}

/// Served instead of a redirect when the gate cookie is missing or invalid.
#[derive(Debug, Serialize)]
pub struct PasswordGateResponse {
    pub code: String,
    pub password_required: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyPasswordRequest {
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPasswordResponse {
    pub verified: bool,
}

/// Owner analytics view for one link.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub code: String,
    pub total_clicks: i64,
    pub last_click: Option<DateTime<Utc>>,
    pub health_checks: Vec<HealthCheck>,
    #[serde(flatten)]
    pub stats: LinkStats,
}
