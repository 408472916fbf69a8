//! API key entity for the programmatic shortening surface.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored API key. Only the SHA-256 of the secret is persisted; the raw
/// key is shown exactly once at creation.
///
/// `bypass_security` and `bypass_rate_limit` are grantable only by
/// administrators and let trusted integrations skip the scan chain or the
/// per-key hourly limit. A revoked key (`is_active = false`) can never be
/// re-activated.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ApiKey {
    pub id: i64,
    pub account_id: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub key_hash: String,
    /// First characters of the raw key, kept for display.
    pub key_prefix: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Requests allowed per hour through this key.
    pub rate_limit: i32,
    pub request_count: i64,
    pub bypass_security: bool,
    pub bypass_rate_limit: bool,
}

impl ApiKey {
    /// Returns true if the key has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }
}

/// Input data for a new key row (the hash, never the raw secret).
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub account_id: String,
    pub name: String,
    pub key_hash: String,
    pub key_prefix: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub rate_limit: i32,
    pub bypass_security: bool,
    pub bypass_rate_limit: bool,
}

/// Authenticated identity resolved from a presented API key.
#[derive(Debug, Clone)]
pub struct ApiKeyIdentity {
    pub api_key_id: i64,
    pub account_id: String,
    pub bypass_security: bool,
    pub bypass_rate_limit: bool,
}
