//! DTOs for the shortening endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ValidationResult;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The destination URL (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Optional password protecting the link.
    #[validate(length(min = 4, max = 128))]
    pub password: Option<String>,

    /// Optional expiry. Ignored for anonymous submissions, which always get
    /// the configured default expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub code: String,
    pub short_url: String,
    /// False when the destination deduplicated onto an existing link.
    pub is_new: bool,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_summary: Option<ScanSummary>,
}

/// Condensed outcome of the validation pass, echoed to the creator.
#[derive(Debug, Serialize)]
pub struct ScanSummary {
    pub is_safe: bool,
    pub providers_consulted: usize,
}

impl ScanSummary {
    pub fn from_validation(result: &ValidationResult) -> Self {
        Self {
            is_safe: result.is_safe,
            providers_consulted: result.scans.len(),
        }
    }
}
