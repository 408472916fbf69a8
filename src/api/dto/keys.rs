//! DTOs for API key management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ApiKey;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateKeyRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    pub expires_at: Option<DateTime<Utc>>,

    /// Requests per hour; defaults server-side when omitted.
    #[validate(range(min = 1, max = 100_000))]
    pub rate_limit: Option<i32>,

    /// Admin-grantable only.
    #[serde(default)]
    pub bypass_security: bool,

    /// Admin-grantable only.
    #[serde(default)]
    pub bypass_rate_limit: bool,
}

/// The only response that ever carries the raw key.
#[derive(Debug, Serialize)]
pub struct CreateKeyResponse {
    pub id: i64,
    pub name: String,
    pub key: String,
    pub key_prefix: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub rate_limit: i32,
}

#[derive(Debug, Serialize)]
pub struct KeyListResponse {
    pub keys: Vec<ApiKey>,
}
