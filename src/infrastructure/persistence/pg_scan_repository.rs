//! PostgreSQL implementation of the scan audit log.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::ScanRecord;
use crate::domain::repositories::ScanRepository;
use crate::error::AppError;

pub struct PgScanRepository {
    pool: Arc<PgPool>,
}

impl PgScanRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScanRepository for PgScanRepository {
    async fn save_scans(&self, content_hash: &str, scans: &[ScanRecord]) -> Result<(), AppError> {
        let link_id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM short_links WHERE content_hash = $1 AND is_active",
        )
        .bind(content_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        // URL rejected before a link was ever created; nothing to attach to.
        let Some(link_id) = link_id else {
            return Ok(());
        };

        let mut tx = self.pool.begin().await?;
        for scan in scans {
            sqlx::query(
                r#"
                INSERT INTO url_scans (link_id, service, result, details, scanned_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(link_id)
            .bind(&scan.service)
            .bind(scan.result)
            .bind(&scan.details)
            .bind(scan.scanned_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn list_for_link(&self, link_id: i64) -> Result<Vec<ScanRecord>, AppError> {
        let scans = sqlx::query_as::<_, PgScanRow>(
            r#"
            SELECT service, result, details, scanned_at
            FROM url_scans
            WHERE link_id = $1
            ORDER BY scanned_at DESC
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(scans.into_iter().map(ScanRecord::from).collect())
    }
}

#[derive(sqlx::FromRow)]
struct PgScanRow {
    service: String,
    result: crate::domain::entities::Verdict,
    details: serde_json::Value,
    scanned_at: chrono::DateTime<chrono::Utc>,
}

impl From<PgScanRow> for ScanRecord {
    fn from(row: PgScanRow) -> Self {
        ScanRecord {
            service: row.service,
            result: row.result,
            details: row.details,
            scanned_at: row.scanned_at,
        }
    }
}
