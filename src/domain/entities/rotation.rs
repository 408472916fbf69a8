//! Rotation destination entity for A/B-style multi-destination links.

use serde::Serialize;

/// One destination of a rotation link.
///
/// `weight` is meaningful only under WEIGHTED rotation. `clicks` is a
/// monotonic counter incremented atomically at the persistence layer.
/// Disabled destinations (`is_active = false`) stay in place so their click
/// history survives, but are never selected.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RotationDestination {
    pub id: i64,
    pub link_id: i64,
    pub destination: String,
    pub weight: i32,
    pub label: Option<String>,
    pub clicks: i64,
    pub is_active: bool,
}

/// Input data for one destination at rotation-link creation.
#[derive(Debug, Clone)]
pub struct NewRotationDestination {
    pub destination: String,
    pub weight: i32,
    pub label: Option<String>,
}

/// Partial update for an existing destination. `None` fields are unchanged.
#[derive(Debug, Clone, Default)]
pub struct RotationDestinationPatch {
    pub destination: Option<String>,
    pub weight: Option<i32>,
    pub label: Option<Option<String>>,
    pub is_active: Option<bool>,
}
