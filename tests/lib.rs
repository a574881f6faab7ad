// Integration tests test your crate's public API. They only have access to items
// in your crate that are marked pub. See the Cargo Targets page of the Cargo Book
// for more information.
//
//   https://doc.rust-lang.org/cargo/reference/cargo-targets.html#integration-tests
//

use journey_sharing_simulator::*;

#[test]
fn test_core_id_types() {
    let waypoint_id = WaypointId::new();

    assert_ne!(waypoint_id, WaypointId::new());
    assert!(waypoint_id.to_string().starts_with("WPT_"));
}

#[test]
fn test_root_reexports() {
    let config = SimulationConfig::default();
    config.validate().unwrap();
    assert_eq!(config.tuning, SimulationTuning::default());

    assert_eq!(TripStatus::from_code(3), Some(TripStatus::EnrouteToDropoff));
    assert_eq!(WaypointType::default(), WaypointType::Pickup);
    assert_eq!(FeedEventKind::ALL.len(), 4);
    assert_eq!(SimulationError::NoSession.code(), "NO_SESSION");
}

#[test]
fn test_end_to_end_feed() {
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    let orchestrator =
        SimulationOrchestrator::new(SimulationConfig { tick_interval_ms: 5, ..Default::default() }).unwrap();
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&statuses);
    let subscription = orchestrator.subscribe(move |event| {
        if let FeedEvent::TripStatusUpdated { status, .. } = event {
            sink.lock().unwrap().push(*status);
        }
    });

    let payload = TripPayload::from_json(
        r#"{"tripName":"e2e","tripStatus":1,"remainingWaypoints":[
            {"location":{"lat":37.422,"lng":-122.084},"waypointType":0},
            {"location":{"lat":37.420,"lng":-122.090},"waypointType":1}]}"#,
    )
    .unwrap();
    orchestrator.start(payload).unwrap();

    let deadline = Instant::now() + Duration::from_secs(20);
    while Instant::now() < deadline {
        if statuses.lock().unwrap().last() == Some(&TripStatus::Completed) {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    let statistics = orchestrator.stop().unwrap();
    subscription.unsubscribe();

    let statuses = statuses.lock().unwrap();
    assert_eq!(statuses.first(), Some(&TripStatus::ArrivedAtPickup));
    assert!(statuses.contains(&TripStatus::EnrouteToDropoff));
    assert_eq!(statuses.last(), Some(&TripStatus::Completed));
    assert_eq!(statistics.status_transitions, 3);
}
