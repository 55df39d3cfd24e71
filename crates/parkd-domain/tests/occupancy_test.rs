use std::sync::Arc;
use std::time::Duration;

use parkd_domain::{
    CreateSpotInput, DeleteSpotInput, Device, DeviceRegistry, DomainError, FreeSpotInput,
    GetSpotInput, InMemoryDeviceRegistry, InMemoryRateLimiter, InMemorySpotStore, ListSpotsInput,
    OccupySpotInput, ParkingService, SpotStatus,
};

struct Harness {
    service: Arc<ParkingService>,
    spot_store: Arc<InMemorySpotStore>,
    registry: Arc<InMemoryDeviceRegistry>,
}

/// Wire the service against the real in-memory stores. Tests that are not
/// about throttling pass a zero window so consecutive actions stay allowed.
fn harness(rate_limit_window: Duration) -> Harness {
    let spot_store = Arc::new(InMemorySpotStore::new());
    let registry = Arc::new(InMemoryDeviceRegistry::new());
    let limiter = Arc::new(InMemoryRateLimiter::new(rate_limit_window));

    let service = Arc::new(ParkingService::new(
        spot_store.clone(),
        registry.clone(),
        limiter,
    ));

    Harness {
        service,
        spot_store,
        registry,
    }
}

async fn register(harness: &Harness, device_id: &str) {
    harness
        .registry
        .register_device(Device::new(device_id.to_string()))
        .await
        .unwrap();
}

async fn create_spot(harness: &Harness, name: &str) -> String {
    harness
        .service
        .create_spot(CreateSpotInput {
            name: name.to_string(),
        })
        .await
        .unwrap()
        .spot_id
}

/// Occupant is set exactly when a spot is occupied, and no device holds
/// more than one spot.
async fn assert_invariants(harness: &Harness) {
    use std::collections::HashSet;
    use parkd_domain::SpotRepository;

    let page = harness.spot_store.list_spots(1, 100).await.unwrap();

    let mut occupants = HashSet::new();
    for spot in &page.spots {
        assert_eq!(
            spot.occupying_device_id.is_some(),
            spot.status == SpotStatus::Occupied,
            "occupant must be set exactly when occupied: {spot:?}"
        );
        if let Some(device_id) = &spot.occupying_device_id {
            assert!(
                occupants.insert(device_id.clone()),
                "device {device_id} occupies more than one spot"
            );
        }
    }
}

#[tokio::test]
async fn test_occupy_free_roundtrip() {
    let harness = harness(Duration::ZERO);
    register(&harness, "device-1").await;
    let spot_id = create_spot(&harness, "A1").await;

    harness
        .service
        .occupy_spot(OccupySpotInput {
            spot_id: spot_id.clone(),
            device_id: "device-1".to_string(),
        })
        .await
        .unwrap();

    let occupied = harness
        .service
        .get_spot(GetSpotInput {
            spot_id: spot_id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(occupied.status, SpotStatus::Occupied);
    assert_eq!(occupied.occupying_device_id.as_deref(), Some("device-1"));
    assert_invariants(&harness).await;

    harness
        .service
        .free_spot(FreeSpotInput {
            spot_id: spot_id.clone(),
            device_id: "device-1".to_string(),
        })
        .await
        .unwrap();

    let freed = harness
        .service
        .get_spot(GetSpotInput { spot_id })
        .await
        .unwrap();
    assert_eq!(freed.status, SpotStatus::Free);
    assert!(freed.occupying_device_id.is_none());
    assert!(freed.last_status_change_at >= occupied.last_status_change_at);
    assert_invariants(&harness).await;
}

#[tokio::test]
async fn test_second_action_within_window_is_rate_limited_regardless_of_spot() {
    let harness = harness(Duration::from_secs(10));
    register(&harness, "device-1").await;
    let first = create_spot(&harness, "A1").await;
    let second = create_spot(&harness, "A2").await;

    harness
        .service
        .occupy_spot(OccupySpotInput {
            spot_id: first.clone(),
            device_id: "device-1".to_string(),
        })
        .await
        .unwrap();

    // Freeing the held spot and occupying a different one are both throttled.
    let free_result = harness
        .service
        .free_spot(FreeSpotInput {
            spot_id: first,
            device_id: "device-1".to_string(),
        })
        .await;
    assert!(matches!(free_result, Err(DomainError::RateLimited(_))));

    let occupy_result = harness
        .service
        .occupy_spot(OccupySpotInput {
            spot_id: second,
            device_id: "device-1".to_string(),
        })
        .await;
    assert!(matches!(occupy_result, Err(DomainError::RateLimited(_))));
}

#[tokio::test]
async fn test_device_cannot_hold_two_spots() {
    let harness = harness(Duration::ZERO);
    register(&harness, "device-1").await;
    let first = create_spot(&harness, "A1").await;
    let second = create_spot(&harness, "A2").await;

    harness
        .service
        .occupy_spot(OccupySpotInput {
            spot_id: first,
            device_id: "device-1".to_string(),
        })
        .await
        .unwrap();

    let result = harness
        .service
        .occupy_spot(OccupySpotInput {
            spot_id: second.clone(),
            device_id: "device-1".to_string(),
        })
        .await;

    assert!(matches!(result, Err(DomainError::DeviceAlreadyOccupying(_))));

    let untouched = harness
        .service
        .get_spot(GetSpotInput { spot_id: second })
        .await
        .unwrap();
    assert_eq!(untouched.status, SpotStatus::Free);
    assert_invariants(&harness).await;
}

#[tokio::test]
async fn test_unregistered_device_is_rejected() {
    let harness = harness(Duration::ZERO);
    let spot_id = create_spot(&harness, "A1").await;

    let result = harness
        .service
        .occupy_spot(OccupySpotInput {
            spot_id,
            device_id: "device-unknown".to_string(),
        })
        .await;

    assert!(matches!(result, Err(DomainError::UnregisteredDevice(_))));
}

#[tokio::test]
async fn test_free_by_non_occupant_leaves_record_unchanged() {
    let harness = harness(Duration::ZERO);
    register(&harness, "device-1").await;
    register(&harness, "device-2").await;
    let spot_id = create_spot(&harness, "A1").await;

    harness
        .service
        .occupy_spot(OccupySpotInput {
            spot_id: spot_id.clone(),
            device_id: "device-1".to_string(),
        })
        .await
        .unwrap();

    let result = harness
        .service
        .free_spot(FreeSpotInput {
            spot_id: spot_id.clone(),
            device_id: "device-2".to_string(),
        })
        .await;
    assert!(matches!(result, Err(DomainError::DeviceNotOccupant(_))));

    let spot = harness
        .service
        .get_spot(GetSpotInput { spot_id })
        .await
        .unwrap();
    assert_eq!(spot.status, SpotStatus::Occupied);
    assert_eq!(spot.occupying_device_id.as_deref(), Some("device-1"));
}

#[tokio::test]
async fn test_concurrent_occupy_has_exactly_one_winner() {
    let harness = harness(Duration::ZERO);
    register(&harness, "device-1").await;
    register(&harness, "device-2").await;
    let spot_id = create_spot(&harness, "A1").await;

    let mut tasks = Vec::new();
    for device_id in ["device-1", "device-2"] {
        let service = harness.service.clone();
        let spot_id = spot_id.clone();
        let device_id = device_id.to_string();
        tasks.push(tokio::spawn(async move {
            service
                .occupy_spot(OccupySpotInput { spot_id, device_id })
                .await
        }));
    }

    let mut winners = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(()) => winners += 1,
            Err(DomainError::SpotAlreadyOccupied(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners, 1);
    assert_invariants(&harness).await;
}

#[tokio::test]
async fn test_listing_is_deterministic_and_clamped() {
    let harness = harness(Duration::ZERO);
    for name in ["B2", "A1", "C3", "A2", "B1"] {
        create_spot(&harness, name).await;
    }

    let page = harness
        .service
        .list_spots(ListSpotsInput {
            page_number: 2,
            page_size: 2,
        })
        .await
        .unwrap();
    let names: Vec<&str> = page.items.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["B1", "B2"]);
    assert_eq!(page.total_count, 5);
    assert_eq!(page.total_pages, 3);

    let rerun = harness
        .service
        .list_spots(ListSpotsInput {
            page_number: 2,
            page_size: 2,
        })
        .await
        .unwrap();
    assert_eq!(page, rerun);

    let clamped = harness
        .service
        .list_spots(ListSpotsInput {
            page_number: 1,
            page_size: 1000,
        })
        .await
        .unwrap();
    assert_eq!(clamped.page_size, 100);
    assert_eq!(clamped.items.len(), 5);
    assert_eq!(clamped.total_pages, 1);

    let minimum = harness
        .service
        .list_spots(ListSpotsInput {
            page_number: 1,
            page_size: 0,
        })
        .await
        .unwrap();
    assert_eq!(minimum.page_size, 1);
    assert_eq!(minimum.items.len(), 1);
}

#[tokio::test]
async fn test_delete_unknown_spot_leaves_collection_unchanged() {
    let harness = harness(Duration::ZERO);
    create_spot(&harness, "A1").await;

    let result = harness
        .service
        .delete_spot(DeleteSpotInput {
            spot_id: "missing".to_string(),
        })
        .await;
    assert!(matches!(result, Err(DomainError::SpotNotFound(_))));

    let page = harness
        .service
        .list_spots(ListSpotsInput::default())
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
}

#[tokio::test]
async fn test_available_count_tracks_transitions() {
    let harness = harness(Duration::ZERO);
    register(&harness, "device-1").await;
    let spot_id = create_spot(&harness, "A1").await;
    create_spot(&harness, "A2").await;

    assert_eq!(harness.service.count_available_spots().await.unwrap(), 2);

    harness
        .service
        .occupy_spot(OccupySpotInput {
            spot_id: spot_id.clone(),
            device_id: "device-1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(harness.service.count_available_spots().await.unwrap(), 1);

    harness
        .service
        .free_spot(FreeSpotInput {
            spot_id,
            device_id: "device-1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(harness.service.count_available_spots().await.unwrap(), 2);
}
