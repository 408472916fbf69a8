//! Short link entity and lifecycle predicates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::health::HealthStatus;

/// Destination selection policy for rotation links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rotation_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RotationType {
    Random,
    Weighted,
    Sequential,
}

/// A shortened URL with its security and lifecycle state.
///
/// Lifecycle: `{none} → active → {expired | flagged | deleted}`. A link is
/// resolvable only while [`ShortLink::is_resolvable`] holds; expiry is
/// evaluated lazily on read and flips `is_active` off.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShortLink {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    /// Hex SHA-256 of the normalized destination, the global dedup key.
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_flagged: bool,
    pub flag_reason: Option<String>,
    pub is_password_protected: bool,
    /// Never serialized, so a cached copy carries `None`; password checks
    /// must read the hash from persistence.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub is_rotation: bool,
    pub rotation_type: Option<RotationType>,
    /// Monotonic counter backing SEQUENTIAL rotation. Advanced only through
    /// an atomic update at the persistence layer.
    pub current_rotation: i32,
    pub health_status: Option<HealthStatus>,
    pub last_health_check: Option<DateTime<Utc>>,
    pub last_status_code: Option<i32>,
}

impl ShortLink {
    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }

    /// A link resolves only while active, unflagged, and unexpired.
    pub fn is_resolvable(&self) -> bool {
        self.is_active && !self.is_flagged && !self.is_expired()
    }
}

/// Input data for creating a new short link row.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub short_code: String,
    pub original_url: String,
    pub content_hash: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
    pub is_rotation: bool,
    pub rotation_type: Option<RotationType>,
}

/// Unit-test fixture used across cache and service tests.
#[cfg(test)]
pub fn test_link(code: &str) -> ShortLink {
    ShortLink {
        id: 1,
        short_code: code.to_string(),
        original_url: "https://example.com/a".to_string(),
        content_hash: "0".repeat(64),
        created_at: Utc::now(),
        expires_at: None,
        is_active: true,
        is_flagged: false,
        flag_reason: None,
        is_password_protected: false,
        password_hash: None,
        is_rotation: false,
        rotation_type: None,
        current_rotation: 0,
        health_status: None,
        last_health_check: None,
        last_status_code: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_active_link_is_resolvable() {
        assert!(test_link("abc1234").is_resolvable());
    }

    #[test]
    fn test_flagged_link_not_resolvable() {
        let mut link = test_link("abc1234");
        link.is_flagged = true;
        assert!(!link.is_resolvable());
    }

    #[test]
    fn test_inactive_link_not_resolvable() {
        let mut link = test_link("abc1234");
        link.is_active = false;
        assert!(!link.is_resolvable());
    }

    #[test]
    fn test_expired_link_not_resolvable() {
        let mut link = test_link("abc1234");
        link.expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(link.is_expired());
        assert!(!link.is_resolvable());
    }

    #[test]
    fn test_future_expiry_still_resolvable() {
        let mut link = test_link("abc1234");
        link.expires_at = Some(Utc::now() + Duration::days(7));
        assert!(link.is_resolvable());
    }
}
