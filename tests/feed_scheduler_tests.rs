//! Tests for the tick scheduler and the published feed
//!
//! Schedulers run with short periods; assertions poll with deadlines instead of
//! sleeping for fixed amounts.

use journey_sharing_simulator::events::{EventBus, FeedEvent, FeedEventKind};
use journey_sharing_simulator::simulation::{
    FeedStatistics, Scheduler, SharedSession, SharedStatistics, SimulationSession,
};
use journey_sharing_simulator::trip::{Coordinate, Trip, Waypoint};
use journey_sharing_simulator::types::{TripStatus, WaypointType};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn session(status: TripStatus) -> SharedSession {
    let trip = Trip::new(
        "feed-trip",
        status,
        vec![
            Waypoint::with_default_title(Coordinate::new(37.422, -122.084), WaypointType::Pickup, "feed-trip"),
            Waypoint::with_default_title(Coordinate::new(37.420, -122.090), WaypointType::Dropoff, "feed-trip"),
        ],
        Trip::DEFAULT_VEHICLE_TYPE,
        "feed-trip",
    )
    .unwrap();
    Arc::new(Mutex::new(SimulationSession::create(trip)))
}

fn statistics() -> SharedStatistics {
    Arc::new(Mutex::new(FeedStatistics::default()))
}

fn recorder(bus: &EventBus) -> Arc<Mutex<Vec<FeedEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    std::mem::forget(bus.subscribe(move |event| sink.lock().push(event.clone())));
    events
}

fn wait_for(deadline: Duration, condition: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn test_events_published_in_fixed_order() {
    let bus = EventBus::new();
    let events = recorder(&bus);

    let mut handle = Scheduler::new(Duration::from_millis(5))
        .start(session(TripStatus::EnrouteToPickup), bus, statistics())
        .unwrap();
    assert!(wait_for(Duration::from_secs(5), || events.lock().len() >= 20));
    handle.stop();

    let events = events.lock();
    let complete_ticks = events.len() / 4;
    assert!(complete_ticks >= 5);
    for (index, event) in events.iter().take(complete_ticks * 4).enumerate() {
        assert_eq!(event.kind(), FeedEventKind::ALL[index % 4], "event {} out of order", index);
    }
}

#[test]
fn test_events_share_one_snapshot_per_tick() {
    let bus = EventBus::new();
    let events = recorder(&bus);

    let mut handle = Scheduler::new(Duration::from_millis(5))
        .start(session(TripStatus::EnrouteToPickup), bus, statistics())
        .unwrap();
    assert!(wait_for(Duration::from_secs(5), || events.lock().len() >= 8));
    handle.stop();

    let events = events.lock();
    for tick in events.chunks_exact(4) {
        let status = match &tick[0] {
            FeedEvent::TripStatusUpdated { status, .. } => *status,
            other => panic!("unexpected first event {}", other.name()),
        };
        for event in tick {
            assert_eq!(event.trip().trip_id, "feed-trip");
            assert_eq!(event.trip().trip_status, status);
            assert_eq!(event.trip().remaining_waypoints.len(), 2);
        }
    }
}

#[test]
fn test_nothing_published_after_stop() {
    let bus = EventBus::new();
    let events = recorder(&bus);

    let mut handle = Scheduler::new(Duration::from_millis(1))
        .start(session(TripStatus::New), bus, statistics())
        .unwrap();
    assert!(wait_for(Duration::from_secs(5), || events.lock().len() >= 4));

    handle.stop();
    assert!(handle.is_finished());
    let count_at_stop = events.lock().len();

    thread::sleep(Duration::from_millis(50));
    assert_eq!(events.lock().len(), count_at_stop);
}

#[test]
fn test_stop_wakes_sleeping_worker() {
    let mut handle = Scheduler::new(Duration::from_secs(3600))
        .start(session(TripStatus::New), EventBus::new(), statistics())
        .unwrap();

    let started = Instant::now();
    handle.stop();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(handle.is_finished());
}

#[test]
fn test_drop_stops_worker() {
    let bus = EventBus::new();
    let events = recorder(&bus);

    let handle = Scheduler::new(Duration::from_millis(1))
        .start(session(TripStatus::New), bus, statistics())
        .unwrap();
    assert!(wait_for(Duration::from_secs(5), || !events.lock().is_empty()));
    drop(handle);

    let count = events.lock().len();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(events.lock().len(), count);
}

#[test]
fn test_terminal_trip_keeps_publishing_same_state() {
    let bus = EventBus::new();
    let events = recorder(&bus);
    let stats = statistics();

    let mut handle = Scheduler::new(Duration::from_millis(1))
        .with_max_ticks(3)
        .start(session(TripStatus::Completed), bus, Arc::clone(&stats))
        .unwrap();
    assert!(wait_for(Duration::from_secs(5), || handle.is_finished()));
    handle.stop();

    let events = events.lock();
    assert_eq!(events.len(), 12);
    assert_eq!(events[0], events[8]);

    let stats = stats.lock();
    assert_eq!(stats.ticks_attempted, 3);
    assert_eq!(stats.ticks_advanced, 0);
    assert_eq!(stats.last_status, Some(TripStatus::Completed));
}

#[test]
fn test_failing_listener_does_not_stop_feed() {
    let bus = EventBus::new();
    // Registered first so every delivery to the recorder comes after a failure
    let _failing = bus.subscribe(|event| {
        if event.kind() == FeedEventKind::VehicleLocationUpdated {
            panic!("subscriber failure");
        }
    });
    let events = recorder(&bus);
    let stats = statistics();

    let mut handle = Scheduler::new(Duration::from_millis(1))
        .with_max_ticks(3)
        .start(session(TripStatus::New), bus, Arc::clone(&stats))
        .unwrap();
    assert!(wait_for(Duration::from_secs(5), || handle.is_finished()));
    handle.stop();

    let events = events.lock();
    assert_eq!(events.len(), 12);
    for (index, event) in events.iter().enumerate() {
        assert_eq!(event.kind(), FeedEventKind::ALL[index % 4]);
    }

    let stats = stats.lock();
    assert_eq!(stats.ticks_attempted, 3);
    assert_eq!(stats.ticks_skipped, 0);
    assert_eq!(stats.total_events(), 12);
    assert_eq!(stats.listener_failures, 3);
}
