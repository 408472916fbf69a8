//! PostgreSQL implementation of the API key repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{ApiKey, NewApiKey};
use crate::domain::repositories::ApiKeyRepository;
use crate::error::AppError;

const KEY_COLUMNS: &str = "id, account_id, name, key_hash, key_prefix, is_active, created_at, \
     last_used, expires_at, rate_limit, request_count, bypass_security, bypass_rate_limit";

pub struct PgApiKeyRepository {
    pool: Arc<PgPool>,
}

impl PgApiKeyRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, AppError> {
        let key = sqlx::query_as::<_, ApiKey>(&format!(
            r#"
            INSERT INTO api_keys
                (account_id, name, key_hash, key_prefix, expires_at, rate_limit,
                 bypass_security, bypass_rate_limit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {KEY_COLUMNS}
            "#
        ))
        .bind(&new_key.account_id)
        .bind(&new_key.name)
        .bind(&new_key.key_hash)
        .bind(&new_key.key_prefix)
        .bind(new_key.expires_at)
        .bind(new_key.rate_limit)
        .bind(new_key.bypass_security)
        .bind(new_key.bypass_rate_limit)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(key)
    }

    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        let key = sqlx::query_as::<_, ApiKey>(&format!(
            "SELECT {KEY_COLUMNS} FROM api_keys WHERE key_hash = $1"
        ))
        .bind(key_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(key)
    }

    async fn deactivate(&self, key_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE id = $1")
            .bind(key_id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn revoke(&self, key_id: i64, account_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE api_keys SET is_active = FALSE WHERE id = $1 AND account_id = $2",
        )
        .bind(key_id)
        .bind(account_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn touch_last_used(&self, key_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE api_keys SET last_used = NOW() WHERE id = $1")
            .bind(key_id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn log_usage(
        &self,
        key_id: i64,
        endpoint: &str,
        method: &str,
        status: i32,
        ip_hash: Option<String>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO api_key_usage (api_key_id, endpoint, method, status_code, ip_hash)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(key_id)
        .bind(endpoint)
        .bind(method)
        .bind(status)
        .bind(ip_hash)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE api_keys SET request_count = request_count + 1 WHERE id = $1")
            .bind(key_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn usage_count_since(
        &self,
        key_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM api_key_usage WHERE api_key_id = $1 AND used_at >= $2",
        )
        .bind(key_id)
        .bind(since)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn list_for_account(&self, account_id: &str) -> Result<Vec<ApiKey>, AppError> {
        let keys = sqlx::query_as::<_, ApiKey>(&format!(
            "SELECT {KEY_COLUMNS} FROM api_keys WHERE account_id = $1 ORDER BY created_at DESC"
        ))
        .bind(account_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(keys)
    }
}
