use chrono::{DateTime, Utc};

/// Domain representation of a registered device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub device_id: String,
    pub registered_at: DateTime<Utc>,
}

impl Device {
    pub fn new(device_id: String) -> Self {
        Self {
            device_id,
            registered_at: Utc::now(),
        }
    }
}
