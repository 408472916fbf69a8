//! DTOs for rotation link management.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{RotationDestination, RotationType};

/// Request to create a rotation link.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRotationRequest {
    /// Primary URL, also the fallback when every destination is disabled.
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    pub rotation_type: RotationType,

    #[validate(length(min = 2, message = "Rotation links need at least two destinations"))]
    #[validate(nested)]
    pub destinations: Vec<DestinationItem>,
}

// Serialize is needed by the Validate derive on the containing Vec; the
// length check records offending values as error params.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DestinationItem {
    #[validate(url(message = "Invalid destination URL"))]
    pub url: String,

    /// Relative weight under WEIGHTED rotation.
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_weight")]
    pub weight: i32,

    #[validate(length(max = 100))]
    pub label: Option<String>,
}

fn default_weight() -> i32 {
    1
}

#[derive(Debug, Serialize)]
pub struct CreateRotationResponse {
    pub code: String,
    pub short_url: String,
    pub rotation_type: RotationType,
    pub destinations: usize,
}

/// Per-destination click breakdown for a rotation link.
#[derive(Debug, Serialize)]
pub struct RotationStatsResponse {
    pub code: String,
    pub rotation_type: Option<RotationType>,
    pub destinations: Vec<RotationDestination>,
}

/// Partial destination update. Omitted fields are unchanged; `label` may be
/// set to null explicitly.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDestinationRequest {
    #[validate(url(message = "Invalid destination URL"))]
    pub destination: Option<String>,

    #[validate(range(min = 1, max = 1000))]
    pub weight: Option<i32>,

    #[serde(default, deserialize_with = "present")]
    pub label: Option<Option<String>>,

    pub is_active: Option<bool>,
}

/// Distinguishes an absent field (outer `None`) from an explicit null
/// (`Some(None)`).
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
