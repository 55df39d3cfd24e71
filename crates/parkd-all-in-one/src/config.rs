use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Minimum seconds a device must wait between status-change actions
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    /// Pre-registered device IDs (comma-separated)
    #[serde(default = "default_seed_device_ids")]
    pub seed_device_ids: String,

    /// Pre-created spot names (comma-separated)
    #[serde(default = "default_seed_spot_names")]
    pub seed_spot_names: String,

    /// Run the simulated device workload
    #[serde(default = "default_simulator_enabled")]
    pub simulator_enabled: bool,

    /// Seconds a simulated device holds a spot before freeing it; should
    /// exceed the rate-limit window or every free attempt gets throttled
    #[serde(default = "default_simulator_hold_secs")]
    pub simulator_hold_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rate_limit_window_secs() -> u64 {
    10
}

fn default_seed_device_ids() -> String {
    "device-0001,device-0002".to_string()
}

fn default_seed_spot_names() -> String {
    "A1,A2,A3".to_string()
}

fn default_simulator_enabled() -> bool {
    true
}

fn default_simulator_hold_secs() -> u64 {
    12
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("PARKD"))
            .build()?
            .try_deserialize()
    }
}
