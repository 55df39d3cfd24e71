use chrono::{DateTime, Utc};

use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotStatus {
    Free,
    Occupied,
}

/// Domain representation of a parking spot.
///
/// `occupying_device_id` is `Some` exactly when `status` is `Occupied`; the
/// transition methods are the only paths that change either field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingSpot {
    pub spot_id: String,
    pub name: String,
    pub status: SpotStatus,
    pub occupying_device_id: Option<String>,
    pub last_status_change_at: DateTime<Utc>,
}

impl ParkingSpot {
    /// Create a new spot, initially free.
    pub fn new(spot_id: String, name: String) -> Self {
        Self {
            spot_id,
            name,
            status: SpotStatus::Free,
            occupying_device_id: None,
            last_status_change_at: Utc::now(),
        }
    }

    /// Transition Free -> Occupied. A same-state transition is a conflict.
    pub fn occupy(&mut self, device_id: String) -> DomainResult<()> {
        if self.status == SpotStatus::Occupied {
            return Err(DomainError::SpotAlreadyOccupied(self.spot_id.clone()));
        }

        self.status = SpotStatus::Occupied;
        self.occupying_device_id = Some(device_id);
        self.last_status_change_at = Utc::now();
        Ok(())
    }

    /// Transition Occupied -> Free. A same-state transition is a conflict.
    pub fn free(&mut self) -> DomainResult<()> {
        if self.status == SpotStatus::Free {
            return Err(DomainError::SpotAlreadyFree(self.spot_id.clone()));
        }

        self.status = SpotStatus::Free;
        self.occupying_device_id = None;
        self.last_status_change_at = Utc::now();
        Ok(())
    }

    pub fn is_free(&self) -> bool {
        self.status == SpotStatus::Free
    }
}
