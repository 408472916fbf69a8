//! PostgreSQL implementation of the deny-list repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{BannedDomain, BannedIp};
use crate::domain::repositories::BanRepository;
use crate::error::AppError;

pub struct PgBanRepository {
    pool: Arc<PgPool>,
}

impl PgBanRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BanRepository for PgBanRepository {
    async fn is_ip_banned(&self, ip: &str) -> Result<bool, AppError> {
        let banned = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM banned_ips WHERE ip = $1)",
        )
        .bind(ip)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(banned)
    }

    async fn find_banned_domain(&self, domain: &str) -> Result<Option<BannedDomain>, AppError> {
        let entry = sqlx::query_as::<_, BannedDomain>(
            "SELECT domain, reason, created_at FROM banned_domains WHERE domain = $1",
        )
        .bind(domain)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(entry)
    }

    async fn ban_ip(&self, ip: &str, reason: Option<String>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO banned_ips (ip, reason)
            VALUES ($1, $2)
            ON CONFLICT (ip) DO UPDATE SET reason = EXCLUDED.reason
            "#,
        )
        .bind(ip)
        .bind(reason)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn unban_ip(&self, ip: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM banned_ips WHERE ip = $1")
            .bind(ip)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ban_domain(&self, domain: &str, reason: Option<String>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO banned_domains (domain, reason)
            VALUES ($1, $2)
            ON CONFLICT (domain) DO UPDATE SET reason = EXCLUDED.reason
            "#,
        )
        .bind(domain)
        .bind(reason)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn unban_domain(&self, domain: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM banned_domains WHERE domain = $1")
            .bind(domain)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_banned_ips(&self) -> Result<Vec<BannedIp>, AppError> {
        let entries = sqlx::query_as::<_, BannedIp>(
            "SELECT ip, reason, created_at FROM banned_ips ORDER BY created_at DESC",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(entries)
    }

    async fn list_banned_domains(&self) -> Result<Vec<BannedDomain>, AppError> {
        let entries = sqlx::query_as::<_, BannedDomain>(
            "SELECT domain, reason, created_at FROM banned_domains ORDER BY created_at DESC",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(entries)
    }
}
