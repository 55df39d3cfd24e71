mod config;
mod simulator;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use config::ServiceConfig;
use parkd_domain::{
    CreateSpotInput, Device, DeviceRegistry, InMemoryDeviceRegistry, InMemoryRateLimiter,
    InMemorySpotStore, ParkingService,
};
use simulator::DeviceSimulator;
use telemetry::init_telemetry;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_telemetry(&config.log_level);

    info!(
        rate_limit_window_secs = config.rate_limit_window_secs,
        simulator_enabled = config.simulator_enabled,
        "Starting parkd-all-in-one service"
    );

    let spot_store = Arc::new(InMemorySpotStore::new());
    let device_registry = Arc::new(InMemoryDeviceRegistry::new());
    let rate_limiter = Arc::new(InMemoryRateLimiter::new(Duration::from_secs(
        config.rate_limit_window_secs,
    )));

    let service = Arc::new(ParkingService::new(
        spot_store,
        device_registry.clone(),
        rate_limiter,
    ));

    if let Err(e) = seed_initial_data(&config, &service, device_registry.as_ref()).await {
        error!("Failed to seed initial data: {}", e);
        std::process::exit(1);
    }

    let shutdown = CancellationToken::new();
    let mut simulators = JoinSet::new();

    if config.simulator_enabled {
        let hold = Duration::from_secs(config.simulator_hold_secs);
        for device_id in parse_list(&config.seed_device_ids) {
            let simulator = DeviceSimulator::new(service.clone(), device_id, hold);
            simulators.spawn(simulator.run(shutdown.clone()));
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }

    shutdown.cancel();
    while simulators.join_next().await.is_some() {}

    info!("parkd-all-in-one stopped");
}

/// Register the pre-seeded devices and create the initial spots.
async fn seed_initial_data(
    config: &ServiceConfig,
    service: &ParkingService,
    device_registry: &InMemoryDeviceRegistry,
) -> anyhow::Result<()> {
    for device_id in parse_list(&config.seed_device_ids) {
        device_registry
            .register_device(Device::new(device_id.clone()))
            .await?;
        info!(device_id = %device_id, "Registered seed device");
    }

    for name in parse_list(&config.seed_spot_names) {
        let spot = service.create_spot(CreateSpotInput { name }).await?;
        info!(spot_id = %spot.spot_id, name = %spot.name, "Created seed spot");
    }

    Ok(())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
