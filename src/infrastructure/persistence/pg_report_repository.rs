//! PostgreSQL implementation of the abuse report repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Report, ReportStatus};
use crate::domain::repositories::ReportRepository;
use crate::error::AppError;

const REPORT_COLUMNS: &str = "id, link_id, reported_by, reason, status, created_at";

pub struct PgReportRepository {
    pool: Arc<PgPool>,
}

impl PgReportRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn exists(&self, link_id: i64, reported_by: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM reports WHERE link_id = $1 AND reported_by = $2)",
        )
        .bind(link_id)
        .bind(reported_by)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn create(
        &self,
        link_id: i64,
        reported_by: &str,
        reason: &str,
    ) -> Result<Report, AppError> {
        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports (link_id, reported_by, reason)
            VALUES ($1, $2, $3)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(link_id)
        .bind(reported_by)
        .bind(reason)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(report)
    }

    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports WHERE link_id = $1")
                .bind(link_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn list_pending(&self, limit: i64) -> Result<Vec<Report>, AppError> {
        let reports = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE status = 'PENDING'
            ORDER BY created_at ASC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(reports)
    }

    async fn resolve(&self, report_id: i64, status: ReportStatus) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE reports SET status = $2 WHERE id = $1")
            .bind(report_id)
            .bind(status)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_pending(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reports WHERE status = 'PENDING'",
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
