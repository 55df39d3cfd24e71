use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{DomainError, DomainResult};
use crate::repository::{SpotRepository, UpdateSpotOutcome};
use crate::spot::{ParkingSpot, SpotStatus};
use crate::types::SpotPage;

/// In-memory implementation of SpotRepository using a HashMap.
///
/// One lock over the whole collection serializes every mutation and the
/// occupancy scan, which is all the atomicity the contract asks for at this
/// entity count.
pub struct InMemorySpotStore {
    spots: RwLock<HashMap<String, ParkingSpot>>,
}

impl InMemorySpotStore {
    pub fn new() -> Self {
        Self {
            spots: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySpotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpotRepository for InMemorySpotStore {
    async fn get_spot(&self, spot_id: &str) -> DomainResult<Option<ParkingSpot>> {
        let spots = self.spots.read().await;
        Ok(spots.get(spot_id).cloned())
    }

    async fn list_spots(&self, page_number: u32, page_size: u32) -> DomainResult<SpotPage> {
        let spots = self.spots.read().await;

        let mut all: Vec<ParkingSpot> = spots.values().cloned().collect();
        // Name alone is not unique; the id tie-break keeps repeated listings
        // stable between mutations.
        all.sort_by(|a, b| (&a.name, &a.spot_id).cmp(&(&b.name, &b.spot_id)));

        let total_count = all.len();
        let offset = (page_number.saturating_sub(1) as usize) * page_size as usize;
        let page: Vec<ParkingSpot> = all.into_iter().skip(offset).take(page_size as usize).collect();

        Ok(SpotPage {
            spots: page,
            total_count,
        })
    }

    async fn add_spot(&self, spot: ParkingSpot) -> DomainResult<()> {
        let mut spots = self.spots.write().await;

        if spots.contains_key(&spot.spot_id) {
            return Err(DomainError::SpotAlreadyExists(spot.spot_id));
        }

        spots.insert(spot.spot_id.clone(), spot);
        Ok(())
    }

    async fn update_spot(
        &self,
        spot: ParkingSpot,
        expected: SpotStatus,
    ) -> DomainResult<UpdateSpotOutcome> {
        let mut spots = self.spots.write().await;

        let current = spots
            .get_mut(&spot.spot_id)
            .ok_or_else(|| DomainError::SpotNotFound(spot.spot_id.clone()))?;

        if current.status != expected {
            return Ok(UpdateSpotOutcome::StatusConflict(current.clone()));
        }

        *current = spot;
        Ok(UpdateSpotOutcome::Applied)
    }

    async fn remove_spot(&self, spot_id: &str) -> DomainResult<()> {
        let mut spots = self.spots.write().await;

        spots
            .remove(spot_id)
            .map(|_| ())
            .ok_or_else(|| DomainError::SpotNotFound(spot_id.to_string()))
    }

    async fn exists_spot_occupied_by(&self, device_id: &str) -> DomainResult<bool> {
        let spots = self.spots.read().await;
        Ok(spots
            .values()
            .any(|spot| spot.occupying_device_id.as_deref() == Some(device_id)))
    }

    async fn count_free_spots(&self) -> DomainResult<usize> {
        let spots = self.spots.read().await;
        Ok(spots.values().filter(|spot| spot.is_free()).count())
    }
}
