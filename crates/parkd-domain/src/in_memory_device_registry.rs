use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::device::Device;
use crate::error::DomainResult;
use crate::repository::DeviceRegistry;

/// In-memory implementation of DeviceRegistry using a HashMap.
pub struct InMemoryDeviceRegistry {
    devices: RwLock<HashMap<String, Device>>,
}

impl InMemoryDeviceRegistry {
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryDeviceRegistry {
    async fn is_registered(&self, device_id: &str) -> DomainResult<bool> {
        let devices = self.devices.read().await;
        Ok(devices.contains_key(device_id))
    }

    async fn register_device(&self, device: Device) -> DomainResult<()> {
        let mut devices = self.devices.write().await;
        // Re-registering keeps the original record.
        devices.entry(device.device_id.clone()).or_insert(device);
        Ok(())
    }

    async fn list_devices(&self) -> DomainResult<Vec<Device>> {
        let devices = self.devices.read().await;
        Ok(devices.values().cloned().collect())
    }
}
