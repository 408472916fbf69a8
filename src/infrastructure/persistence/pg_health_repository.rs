//! PostgreSQL implementation of the health-check log.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{HealthCheck, HealthStatus, NewHealthCheck};
use crate::domain::repositories::HealthRepository;
use crate::error::AppError;

pub struct PgHealthRepository {
    pool: Arc<PgPool>,
}

impl PgHealthRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthRepository for PgHealthRepository {
    async fn record(&self, check: NewHealthCheck) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO health_checks (link_id, status, status_code, response_time_ms, error_message)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(check.link_id)
        .bind(check.status)
        .bind(check.status_code)
        .bind(check.response_time_ms)
        .bind(&check.error_message)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn recent_statuses(
        &self,
        link_id: i64,
        limit: i64,
    ) -> Result<Vec<HealthStatus>, AppError> {
        let statuses = sqlx::query_scalar::<_, HealthStatus>(
            r#"
            SELECT status FROM health_checks
            WHERE link_id = $1
            ORDER BY checked_at DESC
            LIMIT $2
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(statuses)
    }

    async fn history(&self, link_id: i64, limit: i64) -> Result<Vec<HealthCheck>, AppError> {
        let checks = sqlx::query_as::<_, HealthCheck>(
            r#"
            SELECT id, link_id, status, status_code, response_time_ms, error_message, checked_at
            FROM health_checks
            WHERE link_id = $1
            ORDER BY checked_at DESC
            LIMIT $2
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(checks)
    }
}
