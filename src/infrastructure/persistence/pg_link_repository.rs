//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{HealthStatus, NewShortLink, ShortLink};
use crate::domain::repositories::{DetachOutcome, LinkRepository};
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, short_code, original_url, content_hash, created_at, expires_at, \
     is_active, is_flagged, flag_reason, is_password_protected, password_hash, is_rotation, \
     rotation_type, current_rotation, health_status, last_health_check, last_status_code";

/// PostgreSQL repository for short links and their ownership.
///
/// Uses SQLx prepared statements for SQL injection protection and type safety.
/// Counters (`current_rotation`) advance through single atomic UPDATEs; the
/// ownership reference count is enforced inside transactions.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let mut tx = self.pool.begin().await?;

        let link = sqlx::query_as::<_, ShortLink>(&format!(
            r#"
            INSERT INTO short_links
                (short_code, original_url, content_hash, expires_at, password_hash,
                 is_password_protected, is_rotation, rotation_type)
            VALUES ($1, $2, $3, $4, $5, $5 IS NOT NULL, $6, $7)
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(&new_link.short_code)
        .bind(&new_link.original_url)
        .bind(&new_link.content_hash)
        .bind(new_link.expires_at)
        .bind(&new_link.password_hash)
        .bind(new_link.is_rotation)
        .bind(new_link.rotation_type)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO analytics (link_id, clicks) VALUES ($1, 0)")
            .bind(link.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let link = sqlx::query_as::<_, ShortLink>(&format!(
            "SELECT {LINK_COLUMNS} FROM short_links WHERE short_code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn find_active_by_hash(&self, content_hash: &str) -> Result<Option<ShortLink>, AppError> {
        let link = sqlx::query_as::<_, ShortLink>(&format!(
            r#"
            SELECT {LINK_COLUMNS} FROM short_links
            WHERE content_hash = $1 AND is_active AND NOT is_flagged
            "#
        ))
        .bind(content_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn deactivate(&self, link_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE short_links SET is_active = FALSE WHERE id = $1")
            .bind(link_id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn flag(&self, link_id: i64, reason: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET is_flagged = TRUE, is_active = FALSE, flag_reason = $2
            WHERE id = $1
            "#,
        )
        .bind(link_id)
        .bind(reason)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn unflag(&self, link_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET is_flagged = FALSE, is_active = TRUE, flag_reason = NULL
            WHERE id = $1
            "#,
        )
        .bind(link_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn attach_owner(&self, account_id: &str, link_id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO link_owners (account_id, link_id)
            VALUES ($1, $2)
            ON CONFLICT (account_id, link_id) DO NOTHING
            "#,
        )
        .bind(account_id)
        .bind(link_id)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn is_owner(&self, account_id: &str, link_id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM link_owners WHERE account_id = $1 AND link_id = $2)",
        )
        .bind(account_id)
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn detach_owner(
        &self,
        account_id: &str,
        link_id: i64,
    ) -> Result<DetachOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent detaches of the same link; without the row
        // lock two transactions each see the other's owner row still present
        // and neither takes the zero-owner branch.
        sqlx::query("SELECT id FROM short_links WHERE id = $1 FOR UPDATE")
            .bind(link_id)
            .fetch_optional(&mut *tx)
            .await?;

        let deleted = sqlx::query(
            "DELETE FROM link_owners WHERE account_id = $1 AND link_id = $2",
        )
        .bind(account_id)
        .bind(link_id)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(DetachOutcome::NotOwner);
        }

        let remaining = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM link_owners WHERE link_id = $1",
        )
        .bind(link_id)
        .fetch_one(&mut *tx)
        .await?;

        if remaining == 0 {
            // Dependent rows go with the link via ON DELETE CASCADE.
            sqlx::query("DELETE FROM short_links WHERE id = $1")
                .bind(link_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(DetachOutcome::Deleted);
        }

        tx.commit().await?;
        Ok(DetachOutcome::Remaining(remaining))
    }

    async fn force_delete(&self, link_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM short_links WHERE id = $1")
            .bind(link_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE short_links SET is_active = FALSE WHERE is_active AND expires_at <= NOW()",
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn advance_rotation(&self, link_id: i64) -> Result<i32, AppError> {
        // Single atomic update; the pre-increment value selects this
        // resolution's destination.
        let previous = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE short_links
            SET current_rotation = current_rotation + 1
            WHERE id = $1
            RETURNING current_rotation - 1
            "#,
        )
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(previous)
    }

    async fn update_health(
        &self,
        link_id: i64,
        status: HealthStatus,
        status_code: Option<i32>,
        error: Option<String>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE short_links
            SET health_status = $2, last_status_code = $3, health_check_error = $4,
                last_health_check = NOW()
            WHERE id = $1
            "#,
        )
        .bind(link_id)
        .bind(status)
        .bind(status_code)
        .bind(error)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn stale_for_health_check(
        &self,
        stale_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ShortLink>, AppError> {
        let links = sqlx::query_as::<_, ShortLink>(&format!(
            r#"
            SELECT {LINK_COLUMNS} FROM short_links
            WHERE is_active AND NOT is_flagged
              AND (last_health_check IS NULL OR last_health_check < $1)
            ORDER BY last_health_check ASC NULLS FIRST
            LIMIT $2
            "#
        ))
        .bind(stale_before)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn list_for_account(&self, account_id: &str) -> Result<Vec<ShortLink>, AppError> {
        let links = sqlx::query_as::<_, ShortLink>(&format!(
            r#"
            SELECT {LINK_COLUMNS} FROM short_links
            WHERE id IN (SELECT link_id FROM link_owners WHERE account_id = $1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(account_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn admin_counts(&self) -> Result<(i64, i64), AppError> {
        let row = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE is_active) AS active,
                COUNT(*) FILTER (WHERE is_flagged) AS flagged
            FROM short_links
            "#,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row)
    }
}
