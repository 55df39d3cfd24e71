use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{DomainError, DomainResult};
use crate::rate_limiter::ActionRateLimiter;
use crate::repository::{DeviceRegistry, SpotRepository, UpdateSpotOutcome};
use crate::spot::{ParkingSpot, SpotStatus};
use crate::types::{
    CreateSpotInput, DeleteSpotInput, FreeSpotInput, GetSpotInput, ListSpotsInput, OccupySpotInput,
    PaginatedSpots,
};

/// Rate-limit action key shared by both status-change operations, so a
/// device cannot dodge the throttle by alternating occupy and free.
const SPOT_STATUS_CHANGE_ACTION: &str = "spot_status_change";

const MIN_PAGE_SIZE: u32 = 1;
const MAX_PAGE_SIZE: u32 = 100;

/// Domain service orchestrating spot occupancy business logic.
/// Holds no state of its own; every entity is read from and written back to
/// the repository within a single call.
pub struct ParkingService {
    spot_repository: Arc<dyn SpotRepository>,
    device_registry: Arc<dyn DeviceRegistry>,
    rate_limiter: Arc<dyn ActionRateLimiter>,
}

impl ParkingService {
    pub fn new(
        spot_repository: Arc<dyn SpotRepository>,
        device_registry: Arc<dyn DeviceRegistry>,
        rate_limiter: Arc<dyn ActionRateLimiter>,
    ) -> Self {
        Self {
            spot_repository,
            device_registry,
            rate_limiter,
        }
    }

    /// Occupy a free spot on behalf of a device.
    ///
    /// Guard order: rate limit, registration, one-spot-per-device, spot
    /// lookup, state transition. The first failing guard short-circuits the
    /// rest and nothing is written.
    pub async fn occupy_spot(&self, input: OccupySpotInput) -> DomainResult<()> {
        if input.spot_id.is_empty() {
            return Err(DomainError::InvalidSpotId("Spot ID cannot be empty".to_string()));
        }
        if input.device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId("Device ID cannot be empty".to_string()));
        }

        debug!(spot_id = %input.spot_id, device_id = %input.device_id, "Occupying parking spot");

        if !self
            .rate_limiter
            .is_allowed(&input.device_id, SPOT_STATUS_CHANGE_ACTION)
            .await?
        {
            return Err(DomainError::RateLimited(input.device_id));
        }

        if !self.device_registry.is_registered(&input.device_id).await? {
            return Err(DomainError::UnregisteredDevice(input.device_id));
        }

        // A device holds at most one spot system-wide.
        if self
            .spot_repository
            .exists_spot_occupied_by(&input.device_id)
            .await?
        {
            return Err(DomainError::DeviceAlreadyOccupying(input.device_id));
        }

        let mut spot = self
            .spot_repository
            .get_spot(&input.spot_id)
            .await?
            .ok_or_else(|| DomainError::SpotNotFound(input.spot_id.clone()))?;

        spot.occupy(input.device_id.clone())?;

        match self
            .spot_repository
            .update_spot(spot, SpotStatus::Free)
            .await?
        {
            UpdateSpotOutcome::Applied => {
                info!(spot_id = %input.spot_id, device_id = %input.device_id, "Parking spot occupied");
                Ok(())
            }
            // A concurrent caller took the spot between our read and the swap.
            UpdateSpotOutcome::StatusConflict(_) => {
                Err(DomainError::SpotAlreadyOccupied(input.spot_id))
            }
        }
    }

    /// Free an occupied spot on behalf of the device that holds it.
    ///
    /// The same-state conflict is checked before ownership, so freeing an
    /// already-free spot reports the conflict no matter who asks.
    pub async fn free_spot(&self, input: FreeSpotInput) -> DomainResult<()> {
        if input.spot_id.is_empty() {
            return Err(DomainError::InvalidSpotId("Spot ID cannot be empty".to_string()));
        }
        if input.device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId("Device ID cannot be empty".to_string()));
        }

        debug!(spot_id = %input.spot_id, device_id = %input.device_id, "Freeing parking spot");

        if !self
            .rate_limiter
            .is_allowed(&input.device_id, SPOT_STATUS_CHANGE_ACTION)
            .await?
        {
            return Err(DomainError::RateLimited(input.device_id));
        }

        if !self.device_registry.is_registered(&input.device_id).await? {
            return Err(DomainError::UnregisteredDevice(input.device_id));
        }

        let mut spot = self
            .spot_repository
            .get_spot(&input.spot_id)
            .await?
            .ok_or_else(|| DomainError::SpotNotFound(input.spot_id.clone()))?;

        let occupant = spot.occupying_device_id.clone();
        spot.free()?;

        if occupant.as_deref() != Some(input.device_id.as_str()) {
            return Err(DomainError::DeviceNotOccupant(input.device_id));
        }

        match self
            .spot_repository
            .update_spot(spot, SpotStatus::Occupied)
            .await?
        {
            UpdateSpotOutcome::Applied => {
                info!(spot_id = %input.spot_id, device_id = %input.device_id, "Parking spot freed");
                Ok(())
            }
            UpdateSpotOutcome::StatusConflict(_) => {
                Err(DomainError::SpotAlreadyFree(input.spot_id))
            }
        }
    }

    /// Create a new free spot with a generated ID
    pub async fn create_spot(&self, input: CreateSpotInput) -> DomainResult<ParkingSpot> {
        if input.name.trim().is_empty() {
            return Err(DomainError::InvalidSpotName(
                "Spot name cannot be empty".to_string(),
            ));
        }

        let spot_id = xid::new().to_string();

        debug!(spot_id = %spot_id, name = %input.name, "Creating parking spot");

        let spot = ParkingSpot::new(spot_id, input.name);
        self.spot_repository.add_spot(spot.clone()).await?;

        info!(spot_id = %spot.spot_id, "Parking spot created");
        Ok(spot)
    }

    /// Get a spot by ID
    pub async fn get_spot(&self, input: GetSpotInput) -> DomainResult<ParkingSpot> {
        if input.spot_id.is_empty() {
            return Err(DomainError::InvalidSpotId("Spot ID cannot be empty".to_string()));
        }

        debug!(spot_id = %input.spot_id, "Getting parking spot");

        self.spot_repository
            .get_spot(&input.spot_id)
            .await?
            .ok_or(DomainError::SpotNotFound(input.spot_id))
    }

    /// Delete a spot by ID
    pub async fn delete_spot(&self, input: DeleteSpotInput) -> DomainResult<()> {
        if input.spot_id.is_empty() {
            return Err(DomainError::InvalidSpotId("Spot ID cannot be empty".to_string()));
        }

        debug!(spot_id = %input.spot_id, "Deleting parking spot");

        self.spot_repository.remove_spot(&input.spot_id).await?;

        info!(spot_id = %input.spot_id, "Parking spot deleted");
        Ok(())
    }

    /// List one page of spots, clamping pagination values into safe ranges
    pub async fn list_spots(&self, input: ListSpotsInput) -> DomainResult<PaginatedSpots> {
        let page_number = input.page_number.max(1);
        let page_size = input.page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);

        debug!(page_number, page_size, "Listing parking spots");

        let page = self
            .spot_repository
            .list_spots(page_number, page_size)
            .await?;

        let total_pages = (page.total_count as u32).div_ceil(page_size);

        Ok(PaginatedSpots {
            items: page.spots,
            page_number,
            page_size,
            total_count: page.total_count,
            total_pages,
        })
    }

    /// Count of spots currently free across the whole collection
    pub async fn count_available_spots(&self) -> DomainResult<usize> {
        let count = self.spot_repository.count_free_spots().await?;

        debug!(count, "Counted available parking spots");
        Ok(count)
    }
}
