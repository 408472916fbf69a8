//! Repository trait for rotation destinations.

use crate::domain::entities::{
    NewRotationDestination, RotationDestination, RotationDestinationPatch,
};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the destinations behind rotation links.
///
/// Click counters increment through atomic updates at the store, so
/// concurrent resolutions never lose counts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RotationRepository: Send + Sync {
    /// Inserts the destination set for a new rotation link.
    async fn create_many(
        &self,
        link_id: i64,
        destinations: Vec<NewRotationDestination>,
    ) -> Result<(), AppError>;

    /// Active destinations for a link, in insertion order.
    async fn list_active(&self, link_id: i64) -> Result<Vec<RotationDestination>, AppError>;

    /// All destinations for a link (including disabled), in insertion order.
    async fn list_all(&self, link_id: i64) -> Result<Vec<RotationDestination>, AppError>;

    /// Looks up one destination by id.
    async fn find(&self, destination_id: i64) -> Result<Option<RotationDestination>, AppError>;

    /// Atomically increments a destination's click counter.
    async fn increment_clicks(&self, destination_id: i64) -> Result<(), AppError>;

    /// Applies a partial update. Returns false if the destination is absent.
    async fn update(
        &self,
        destination_id: i64,
        patch: RotationDestinationPatch,
    ) -> Result<bool, AppError>;

    /// Deletes a destination outright. Returns false if absent.
    async fn delete(&self, destination_id: i64) -> Result<bool, AppError>;
}
