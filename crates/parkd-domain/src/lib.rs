pub mod device;
pub mod error;
pub mod in_memory_device_registry;
pub mod in_memory_spot_store;
pub mod parking_service;
pub mod rate_limiter;
pub mod repository;
pub mod spot;
pub mod types;

pub use device::Device;
pub use error::{DomainError, DomainResult, ErrorKind};
pub use in_memory_device_registry::InMemoryDeviceRegistry;
pub use in_memory_spot_store::InMemorySpotStore;
pub use parking_service::ParkingService;
pub use rate_limiter::{ActionRateLimiter, DEFAULT_RATE_LIMIT_WINDOW, InMemoryRateLimiter};
pub use repository::{DeviceRegistry, SpotRepository, UpdateSpotOutcome};
pub use spot::{ParkingSpot, SpotStatus};
pub use types::*;
