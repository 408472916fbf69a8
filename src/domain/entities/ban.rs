//! Deny-list entries.
//!
//! Presence of a ban short-circuits rate limiting and URL validation before
//! any external provider is consulted. Bans fail closed.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BannedIp {
    pub ip: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BannedDomain {
    pub domain: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
