//! PostgreSQL implementation of the click log and analytics rollup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{Analytics, ClickRow};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record(&self, event: ClickEvent) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let link_id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM short_links WHERE short_code = $1",
        )
        .bind(&event.short_code)
        .fetch_optional(&mut *tx)
        .await?;

        // The link may have been deleted between redirect and drain.
        let Some(link_id) = link_id else {
            tx.rollback().await?;
            return Ok(());
        };

        sqlx::query(
            r#"
            INSERT INTO click_events
                (link_id, ip_hash, user_agent, referer, utm_source, utm_medium, utm_campaign)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(link_id)
        .bind(&event.ip_hash)
        .bind(&event.user_agent)
        .bind(&event.referer)
        .bind(&event.utm_source)
        .bind(&event.utm_medium)
        .bind(&event.utm_campaign)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO analytics (link_id, clicks, last_click)
            VALUES ($1, 1, NOW())
            ON CONFLICT (link_id)
            DO UPDATE SET clicks = analytics.clicks + 1, last_click = NOW()
            "#,
        )
        .bind(link_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn analytics(&self, link_id: i64) -> Result<Option<Analytics>, AppError> {
        let rollup = sqlx::query_as::<_, Analytics>(
            "SELECT link_id, clicks, last_click FROM analytics WHERE link_id = $1",
        )
        .bind(link_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(rollup)
    }

    async fn recent(&self, link_id: i64, limit: i64) -> Result<Vec<ClickRow>, AppError> {
        let rows = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT clicked_at, ip_hash, user_agent, referer,
                   utm_source, utm_medium, utm_campaign
            FROM click_events
            WHERE link_id = $1
            ORDER BY clicked_at DESC
            LIMIT $2
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM click_events WHERE clicked_at < $1")
            .bind(cutoff)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        // SUM over bigint widens to numeric; cast back down.
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(clicks), 0)::bigint FROM analytics",
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(total)
    }
}
