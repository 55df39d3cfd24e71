use std::sync::Arc;
use std::time::Duration;

use parkd_domain::{FreeSpotInput, ListSpotsInput, OccupySpotInput, ParkingService};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One simulated IoT device cycling occupy -> hold -> free against the
/// service. Denials (rate limit, lost races, no free spot) are expected
/// under contention and only logged.
pub struct DeviceSimulator {
    service: Arc<ParkingService>,
    device_id: String,
    hold: Duration,
}

impl DeviceSimulator {
    pub fn new(service: Arc<ParkingService>, device_id: String, hold: Duration) -> Self {
        Self {
            service,
            device_id,
            hold,
        }
    }

    pub async fn run(self, shutdown: CancellationToken) {
        info!(device_id = %self.device_id, "Device simulator started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(device_id = %self.device_id, "Device simulator stopping");
                    break;
                }
                _ = self.cycle() => {}
            }
        }
    }

    async fn cycle(&self) {
        match self.find_free_spot().await {
            Some(spot_id) => self.occupy_then_free(spot_id).await,
            None => debug!(device_id = %self.device_id, "No free spot available"),
        }

        if let Ok(count) = self.service.count_available_spots().await {
            debug!(device_id = %self.device_id, available = count, "Cycle finished");
        }

        tokio::time::sleep(self.hold).await;
    }

    async fn occupy_then_free(&self, spot_id: String) {
        let occupy = self
            .service
            .occupy_spot(OccupySpotInput {
                spot_id: spot_id.clone(),
                device_id: self.device_id.clone(),
            })
            .await;

        if let Err(error) = occupy {
            debug!(device_id = %self.device_id, spot_id = %spot_id, %error, "Occupy attempt denied");
            return;
        }

        info!(device_id = %self.device_id, spot_id = %spot_id, "Occupied spot");

        // Hold past the rate-limit window so the free attempt is allowed.
        tokio::time::sleep(self.hold).await;

        match self
            .service
            .free_spot(FreeSpotInput {
                spot_id: spot_id.clone(),
                device_id: self.device_id.clone(),
            })
            .await
        {
            Ok(()) => info!(device_id = %self.device_id, spot_id = %spot_id, "Freed spot"),
            Err(error) => {
                warn!(device_id = %self.device_id, spot_id = %spot_id, %error, "Failed to free spot")
            }
        }
    }

    /// First free spot in listing order; every simulator chasing the same
    /// spot is what exercises the conflict paths.
    async fn find_free_spot(&self) -> Option<String> {
        let page = self
            .service
            .list_spots(ListSpotsInput {
                page_number: 1,
                page_size: 100,
            })
            .await
            .ok()?;

        page.items
            .into_iter()
            .find(|spot| spot.is_free())
            .map(|spot| spot.spot_id)
    }
}
