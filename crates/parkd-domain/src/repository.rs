use async_trait::async_trait;

use crate::device::Device;
use crate::error::DomainResult;
use crate::spot::{ParkingSpot, SpotStatus};
use crate::types::SpotPage;

/// Result of a status-guarded replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateSpotOutcome {
    /// The record was swapped.
    Applied,
    /// The stored status no longer matched what the caller read; the write
    /// was not applied and the latest record is returned instead.
    StatusConflict(ParkingSpot),
}

/// Repository trait for parking spot storage operations
/// Implementations must serialize mutations and the occupancy scan so no
/// half-written record is ever observable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpotRepository: Send + Sync {
    /// Get a spot by ID; absence is `None`, not an error
    async fn get_spot(&self, spot_id: &str) -> DomainResult<Option<ParkingSpot>>;

    /// List one page of spots ordered by (name, id) ascending, plus the
    /// total count. Paging values arrive already clamped by the service.
    async fn list_spots(&self, page_number: u32, page_size: u32) -> DomainResult<SpotPage>;

    /// Insert a new spot; fails with `SpotAlreadyExists` on an ID collision
    async fn add_spot(&self, spot: ParkingSpot) -> DomainResult<()>;

    /// Full-record swap, applied only while the stored status still equals
    /// `expected`. Fails with `SpotNotFound` if the ID is absent.
    async fn update_spot(
        &self,
        spot: ParkingSpot,
        expected: SpotStatus,
    ) -> DomainResult<UpdateSpotOutcome>;

    /// Remove a spot; fails with `SpotNotFound` if absent
    async fn remove_spot(&self, spot_id: &str) -> DomainResult<()>;

    /// Whether any spot is currently occupied by the given device
    async fn exists_spot_occupied_by(&self, device_id: &str) -> DomainResult<bool>;

    /// Count of spots currently free
    async fn count_free_spots(&self) -> DomainResult<usize>;
}

/// Registry trait for known device identities
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Whether the device has been registered
    async fn is_registered(&self, device_id: &str) -> DomainResult<bool>;

    /// Idempotent insert; re-registering an existing device is a no-op
    async fn register_device(&self, device: Device) -> DomainResult<()>;

    /// All registered devices, for administrative inspection
    async fn list_devices(&self) -> DomainResult<Vec<Device>>;
}
