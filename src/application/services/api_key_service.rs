//! API key issuance, authentication, and usage accounting.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde_json::json;
use tracing::info;

use crate::domain::entities::{ApiKey, ApiKeyIdentity, NewApiKey};
use crate::domain::repositories::ApiKeyRepository;
use crate::error::AppError;
use crate::utils::hashing::hash_api_key;

const KEY_PREFIX: &str = "sk_live_";
const KEY_SECRET_LENGTH: usize = 32;
/// Characters of the raw key kept for display in listings.
const DISPLAY_PREFIX_LENGTH: usize = 12;
const DEFAULT_HOURLY_LIMIT: i32 = 100;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A freshly issued key. The raw secret exists only in this value; the store
/// keeps its hash.
#[derive(Debug)]
pub struct IssuedKey {
    pub key: ApiKey,
    pub raw_key: String,
}

/// Manages the programmatic-access keys for the v1 API surface.
pub struct ApiKeyService {
    keys: Arc<dyn ApiKeyRepository>,
}

impl ApiKeyService {
    pub fn new(keys: Arc<dyn ApiKeyRepository>) -> Self {
        Self { keys }
    }

    /// Issues a new key. Bypass grants are the caller's responsibility to
    /// gate (admin only).
    pub async fn issue(
        &self,
        account_id: &str,
        name: &str,
        expires_at: Option<DateTime<Utc>>,
        rate_limit: Option<i32>,
        bypass_security: bool,
        bypass_rate_limit: bool,
    ) -> Result<IssuedKey, AppError> {
        let raw_key = generate_raw_key();
        let rate_limit = rate_limit.unwrap_or(DEFAULT_HOURLY_LIMIT);
        if rate_limit < 1 {
            return Err(AppError::bad_request(
                "Rate limit must be positive",
                json!({ "rate_limit": rate_limit }),
            ));
        }

        let key = self
            .keys
            .create(NewApiKey {
                account_id: account_id.to_string(),
                name: name.to_string(),
                key_hash: hash_api_key(&raw_key),
                key_prefix: raw_key[..DISPLAY_PREFIX_LENGTH].to_string(),
                expires_at,
                rate_limit,
                bypass_security,
                bypass_rate_limit,
            })
            .await?;

        info!(account_id, key_id = key.id, "API key issued");
        Ok(IssuedKey { key, raw_key })
    }

    /// Authenticates a presented key and enforces its hourly usage limit.
    ///
    /// Expiry is evaluated lazily: an expired key is deactivated on first
    /// use past its expiry and rejected.
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthorized`] for unknown, revoked, or expired keys
    /// - [`AppError::RateLimited`] when the hourly window is exhausted
    pub async fn authenticate(&self, raw_key: &str) -> Result<ApiKeyIdentity, AppError> {
        let Some(key) = self.keys.find_by_hash(&hash_api_key(raw_key)).await? else {
            return Err(AppError::unauthorized("Invalid API key", json!({})));
        };

        if !key.is_active {
            return Err(AppError::unauthorized("API key has been revoked", json!({})));
        }

        if key.is_expired() {
            self.keys.deactivate(key.id).await?;
            return Err(AppError::unauthorized("API key has expired", json!({})));
        }

        if !key.bypass_rate_limit {
            let window_start = Utc::now() - Duration::hours(1);
            let used = self.keys.usage_count_since(key.id, window_start).await?;
            if used >= i64::from(key.rate_limit) {
                return Err(AppError::rate_limited(
                    "API key hourly limit exceeded",
                    json!({ "limit": key.rate_limit }),
                ));
            }
        }

        self.keys.touch_last_used(key.id).await?;

        Ok(ApiKeyIdentity {
            api_key_id: key.id,
            account_id: key.account_id,
            bypass_security: key.bypass_security,
            bypass_rate_limit: key.bypass_rate_limit,
        })
    }

    /// Records one authenticated request against the key.
    pub async fn log_usage(
        &self,
        key_id: i64,
        endpoint: &str,
        method: &str,
        status: i32,
        ip_hash: Option<String>,
    ) -> Result<(), AppError> {
        self.keys
            .log_usage(key_id, endpoint, method, status, ip_hash)
            .await
    }

    /// Revokes a key owned by the account.
    pub async fn revoke(&self, key_id: i64, account_id: &str) -> Result<(), AppError> {
        if !self.keys.revoke(key_id, account_id).await? {
            return Err(AppError::not_found(
                "API key not found",
                json!({ "id": key_id }),
            ));
        }
        info!(account_id, key_id, "API key revoked");
        Ok(())
    }

    pub async fn list_for_account(&self, account_id: &str) -> Result<Vec<ApiKey>, AppError> {
        self.keys.list_for_account(account_id).await
    }
}

fn generate_raw_key() -> String {
    let mut rng = rand::rng();
    let secret: String = (0..KEY_SECRET_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}{}", KEY_PREFIX, secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockApiKeyRepository;

    fn stored_key(id: i64) -> ApiKey {
        ApiKey {
            id,
            account_id: "acct-1".to_string(),
            name: "ci".to_string(),
            key_hash: "h".to_string(),
            key_prefix: "sk_live_abcd".to_string(),
            is_active: true,
            created_at: Utc::now(),
            last_used: None,
            expires_at: None,
            rate_limit: 100,
            request_count: 0,
            bypass_security: false,
            bypass_rate_limit: false,
        }
    }

    #[test]
    fn test_raw_key_shape() {
        let raw = generate_raw_key();
        assert!(raw.starts_with(KEY_PREFIX));
        assert_eq!(raw.len(), KEY_PREFIX.len() + KEY_SECRET_LENGTH);
        assert_ne!(generate_raw_key(), raw);
    }

    #[tokio::test]
    async fn test_unknown_key_is_unauthorized() {
        let mut keys = MockApiKeyRepository::new();
        keys.expect_find_by_hash().returning(|_| Ok(None));

        let service = ApiKeyService::new(Arc::new(keys));
        let err = service.authenticate("sk_live_nope").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_expired_key_is_deactivated_lazily() {
        let mut keys = MockApiKeyRepository::new();
        keys.expect_find_by_hash().returning(|_| {
            let mut key = stored_key(9);
            key.expires_at = Some(Utc::now() - Duration::hours(1));
            Ok(Some(key))
        });
        keys.expect_deactivate()
            .withf(|id| *id == 9)
            .times(1)
            .returning(|_| Ok(()));

        let service = ApiKeyService::new(Arc::new(keys));
        let err = service.authenticate("sk_live_old").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_hourly_limit_enforced() {
        let mut keys = MockApiKeyRepository::new();
        keys.expect_find_by_hash()
            .returning(|_| Ok(Some(stored_key(3))));
        keys.expect_usage_count_since().returning(|_, _| Ok(100));

        let service = ApiKeyService::new(Arc::new(keys));
        let err = service.authenticate("sk_live_busy").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_bypass_rate_limit_skips_usage_check() {
        let mut keys = MockApiKeyRepository::new();
        keys.expect_find_by_hash().returning(|_| {
            let mut key = stored_key(4);
            key.bypass_rate_limit = true;
            Ok(Some(key))
        });
        keys.expect_touch_last_used().returning(|_| Ok(()));

        let service = ApiKeyService::new(Arc::new(keys));
        let identity = service.authenticate("sk_live_vip").await.unwrap();
        assert!(identity.bypass_rate_limit);
    }
}
