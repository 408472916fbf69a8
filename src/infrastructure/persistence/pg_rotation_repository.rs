//! PostgreSQL implementation of the rotation destination repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{
    NewRotationDestination, RotationDestination, RotationDestinationPatch,
};
use crate::domain::repositories::RotationRepository;
use crate::error::AppError;

pub struct PgRotationRepository {
    pool: Arc<PgPool>,
}

impl PgRotationRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RotationRepository for PgRotationRepository {
    async fn create_many(
        &self,
        link_id: i64,
        destinations: Vec<NewRotationDestination>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for destination in &destinations {
            sqlx::query(
                r#"
                INSERT INTO rotation_destinations (link_id, destination, weight, label)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(link_id)
            .bind(&destination.destination)
            .bind(destination.weight)
            .bind(&destination.label)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_active(&self, link_id: i64) -> Result<Vec<RotationDestination>, AppError> {
        let destinations = sqlx::query_as::<_, RotationDestination>(
            r#"
            SELECT id, link_id, destination, weight, label, clicks, is_active
            FROM rotation_destinations
            WHERE link_id = $1 AND is_active
            ORDER BY id
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(destinations)
    }

    async fn list_all(&self, link_id: i64) -> Result<Vec<RotationDestination>, AppError> {
        let destinations = sqlx::query_as::<_, RotationDestination>(
            r#"
            SELECT id, link_id, destination, weight, label, clicks, is_active
            FROM rotation_destinations
            WHERE link_id = $1
            ORDER BY id
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(destinations)
    }

    async fn find(&self, destination_id: i64) -> Result<Option<RotationDestination>, AppError> {
        let destination = sqlx::query_as::<_, RotationDestination>(
            r#"
            SELECT id, link_id, destination, weight, label, clicks, is_active
            FROM rotation_destinations
            WHERE id = $1
            "#,
        )
        .bind(destination_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(destination)
    }

    async fn increment_clicks(&self, destination_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE rotation_destinations SET clicks = clicks + 1 WHERE id = $1")
            .bind(destination_id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        destination_id: i64,
        patch: RotationDestinationPatch,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE rotation_destinations
            SET destination = COALESCE($2, destination),
                weight = COALESCE($3, weight),
                label = CASE WHEN $4 THEN $5 ELSE label END,
                is_active = COALESCE($6, is_active)
            WHERE id = $1
            "#,
        )
        .bind(destination_id)
        .bind(patch.destination)
        .bind(patch.weight)
        .bind(patch.label.is_some())
        .bind(patch.label.flatten())
        .bind(patch.is_active)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, destination_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM rotation_destinations WHERE id = $1")
            .bind(destination_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
