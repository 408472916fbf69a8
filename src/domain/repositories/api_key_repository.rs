//! Repository trait for API keys and their usage log.

use crate::domain::entities::{ApiKey, NewApiKey};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for API key storage, revocation, and usage
/// accounting. The usage log drives the per-key hourly rate limit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, AppError>;

    /// Looks a key up by the SHA-256 of the presented secret.
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError>;

    /// Deactivates a key. Used both for lazy expiry and revocation; a
    /// deactivated key is never reactivated.
    async fn deactivate(&self, key_id: i64) -> Result<(), AppError>;

    /// Revokes a key owned by the given account. Returns false when the key
    /// is absent or owned by someone else.
    async fn revoke(&self, key_id: i64, account_id: &str) -> Result<bool, AppError>;

    /// Stamps `last_used` on successful authentication.
    async fn touch_last_used(&self, key_id: i64) -> Result<(), AppError>;

    /// Appends a usage row and increments the key's request counter.
    async fn log_usage(
        &self,
        key_id: i64,
        endpoint: &str,
        method: &str,
        status: i32,
        ip_hash: Option<String>,
    ) -> Result<(), AppError>;

    /// Usage rows recorded since the given instant (hourly window count).
    async fn usage_count_since(
        &self,
        key_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError>;

    /// Keys belonging to an account, newest first.
    async fn list_for_account(&self, account_id: &str) -> Result<Vec<ApiKey>, AppError>;
}
