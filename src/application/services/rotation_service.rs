//! Destination selection for rotation links.

use std::sync::Arc;

use rand::Rng;
use serde_json::json;

use crate::domain::entities::{RotationDestination, RotationType, ShortLink};
use crate::domain::repositories::{LinkRepository, RotationRepository};
use crate::error::AppError;

/// Picks the destination for one resolution of a rotation link.
///
/// RANDOM draws uniformly, WEIGHTED draws by cumulative weight, SEQUENTIAL
/// round-robins off an index advanced atomically at the persistence layer.
/// If the eligible set changes mid-flight, SEQUENTIAL may transiently skip
/// or repeat a destination; this is a documented consistency relaxation.
pub struct RotationService {
    links: Arc<dyn LinkRepository>,
    rotations: Arc<dyn RotationRepository>,
}

impl RotationService {
    pub fn new(links: Arc<dyn LinkRepository>, rotations: Arc<dyn RotationRepository>) -> Self {
        Self { links, rotations }
    }

    /// Selects a destination and atomically bumps its click counter.
    /// Returns `None` when the link has no active destinations.
    pub async fn select_destination(
        &self,
        link: &ShortLink,
    ) -> Result<Option<RotationDestination>, AppError> {
        let Some(rotation_type) = link.rotation_type else {
            return Err(AppError::internal(
                "Rotation link without rotation type",
                json!({ "id": link.id }),
            ));
        };

        let eligible = self.rotations.list_active(link.id).await?;
        if eligible.is_empty() {
            return Ok(None);
        }

        let chosen = match rotation_type {
            RotationType::Random => {
                let index = rand::rng().random_range(0..eligible.len());
                eligible
                    .into_iter()
                    .nth(index)
                    .ok_or_else(|| AppError::internal("Rotation index out of range", json!({})))?
            }
            RotationType::Weighted => pick_weighted(eligible)?,
            RotationType::Sequential => {
                let previous = self.links.advance_rotation(link.id).await?;
                let count = eligible.len();
                let index = (previous.rem_euclid(count as i32)) as usize;
                eligible
                    .into_iter()
                    .nth(index)
                    .ok_or_else(|| AppError::internal("Rotation index out of range", json!({})))?
            }
        };

        self.rotations.increment_clicks(chosen.id).await?;
        Ok(Some(chosen))
    }

    pub async fn list_all(&self, link_id: i64) -> Result<Vec<RotationDestination>, AppError> {
        self.rotations.list_all(link_id).await
    }

    pub async fn find(
        &self,
        destination_id: i64,
    ) -> Result<Option<RotationDestination>, AppError> {
        self.rotations.find(destination_id).await
    }

    pub async fn update(
        &self,
        destination_id: i64,
        patch: crate::domain::entities::RotationDestinationPatch,
    ) -> Result<bool, AppError> {
        self.rotations.update(destination_id, patch).await
    }

    pub async fn delete(&self, destination_id: i64) -> Result<bool, AppError> {
        self.rotations.delete(destination_id).await
    }
}

/// Cumulative-weight draw: uniform value in `[0, total)`, walk the list
/// subtracting weights until the remainder goes negative.
fn pick_weighted(eligible: Vec<RotationDestination>) -> Result<RotationDestination, AppError> {
    let total: i64 = eligible.iter().map(|d| i64::from(d.weight.max(0))).sum();
    if total <= 0 {
        // All-zero weights degenerate to a uniform pick.
        let index = rand::rng().random_range(0..eligible.len());
        return eligible
            .into_iter()
            .nth(index)
            .ok_or_else(|| AppError::internal("Rotation index out of range", json!({})));
    }

    let mut remainder = rand::rng().random_range(0..total);
    let last = eligible.len() - 1;
    for (index, destination) in eligible.into_iter().enumerate() {
        remainder -= i64::from(destination.weight.max(0));
        if remainder < 0 || index == last {
            return Ok(destination);
        }
    }

    Err(AppError::internal("Weighted pick fell through", json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::short_link::test_link;
    use crate::domain::repositories::{MockLinkRepository, MockRotationRepository};
    use std::sync::atomic::{AtomicI32, Ordering};

    fn dest(id: i64, weight: i32) -> RotationDestination {
        RotationDestination {
            id,
            link_id: 1,
            destination: format!("https://example.com/{}", id),
            weight,
            label: None,
            clicks: 0,
            is_active: true,
        }
    }

    fn rotation_link(rotation_type: RotationType) -> ShortLink {
        let mut link = test_link("rotate1");
        link.is_rotation = true;
        link.rotation_type = Some(rotation_type);
        link
    }

    #[tokio::test]
    async fn test_no_active_destinations_yields_none() {
        let links = MockLinkRepository::new();
        let mut rotations = MockRotationRepository::new();
        rotations.expect_list_active().returning(|_| Ok(Vec::new()));

        let service = RotationService::new(Arc::new(links), Arc::new(rotations));
        let picked = service
            .select_destination(&rotation_link(RotationType::Random))
            .await
            .unwrap();

        assert!(picked.is_none());
    }

    #[tokio::test]
    async fn test_sequential_round_robin_visits_each_exactly_once() {
        let links = {
            let mut links = MockLinkRepository::new();
            let counter = AtomicI32::new(0);
            links
                .expect_advance_rotation()
                .returning(move |_| Ok(counter.fetch_add(1, Ordering::SeqCst)));
            links
        };
        let mut rotations = MockRotationRepository::new();
        rotations
            .expect_list_active()
            .returning(|_| Ok(vec![dest(1, 1), dest(2, 1), dest(3, 1)]));
        rotations.expect_increment_clicks().returning(|_| Ok(()));

        let service = RotationService::new(Arc::new(links), Arc::new(rotations));
        let link = rotation_link(RotationType::Sequential);

        let mut seen = Vec::new();
        for _ in 0..6 {
            let picked = service.select_destination(&link).await.unwrap().unwrap();
            seen.push(picked.id);
        }

        assert_eq!(seen, vec![1, 2, 3, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_weighted_pick_converges_on_weight_ratio() {
        let links = MockLinkRepository::new();
        let mut rotations = MockRotationRepository::new();
        rotations
            .expect_list_active()
            .returning(|_| Ok(vec![dest(1, 1), dest(2, 3)]));
        rotations.expect_increment_clicks().returning(|_| Ok(()));

        let service = RotationService::new(Arc::new(links), Arc::new(rotations));
        let link = rotation_link(RotationType::Weighted);

        let mut heavy = 0u32;
        const DRAWS: u32 = 4000;
        for _ in 0..DRAWS {
            let picked = service.select_destination(&link).await.unwrap().unwrap();
            if picked.id == 2 {
                heavy += 1;
            }
        }

        // Expect roughly 75%; allow a generous band for randomness.
        let share = f64::from(heavy) / f64::from(DRAWS);
        assert!((0.68..0.82).contains(&share), "share was {share}");
    }

    #[tokio::test]
    async fn test_random_pick_only_selects_eligible() {
        let links = MockLinkRepository::new();
        let mut rotations = MockRotationRepository::new();
        rotations
            .expect_list_active()
            .returning(|_| Ok(vec![dest(7, 1)]));
        rotations.expect_increment_clicks().returning(|_| Ok(()));

        let service = RotationService::new(Arc::new(links), Arc::new(rotations));
        let picked = service
            .select_destination(&rotation_link(RotationType::Random))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(picked.id, 7);
    }

    #[test]
    fn test_weighted_walk_respects_cumulative_bounds() {
        // With weights [2, 1] a remainder of 0 or 1 lands on the first
        // destination and 2 on the second; exercised indirectly through the
        // draw above, directly here via the degenerate single-entry case.
        let picked = pick_weighted(vec![dest(1, 5)]).unwrap();
        assert_eq!(picked.id, 1);
    }
}
