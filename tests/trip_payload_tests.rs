//! Tests for the start payload boundary
//!
//! These tests feed JSON the way a host bridge would and check both the
//! defaults applied and the structured rejection causes.

use journey_sharing_simulator::simulation::SimulationError;
use journey_sharing_simulator::trip::{Coordinate, Trip, TripPayload, TripValidationError, Waypoint};
use journey_sharing_simulator::types::{TripStatus, WaypointType};

fn reject(json: &str) -> TripValidationError {
    TripPayload::from_json(json).and_then(TripPayload::into_trip).unwrap_err()
}

#[test]
fn test_full_payload_from_host() {
    let trip = TripPayload::from_json(
        r#"{
            "tripName": "providers/p/trips/t-1",
            "tripStatus": 1,
            "vehicleTypeId": "sedan",
            "bookingId": "booking-9",
            "remainingWaypoints": [
                { "location": { "lat": 37.422, "lng": -122.084 }, "waypointType": 0 },
                { "location": { "lat": 37.421, "lng": -122.087 }, "waypointType": 2 },
                { "location": { "lat": 37.420, "lng": -122.090 }, "waypointType": 1, "title": "Office" }
            ]
        }"#,
    )
    .and_then(TripPayload::into_trip)
    .unwrap();

    assert_eq!(trip.id(), "providers/p/trips/t-1");
    assert_eq!(trip.status(), TripStatus::EnrouteToPickup);
    assert_eq!(trip.vehicle_type_id(), "sedan");
    assert_eq!(trip.booking_id(), "booking-9");

    let titles: Vec<_> = trip.waypoints().iter().map(|w| w.title.as_str()).collect();
    assert_eq!(titles, vec!["Pickup", "Stop", "Office"]);
    let types: Vec<_> = trip.waypoints().iter().map(|w| w.waypoint_type).collect();
    assert_eq!(types, vec![WaypointType::Pickup, WaypointType::Intermediate, WaypointType::Dropoff]);
    assert!(trip.waypoints().iter().all(|w| w.trip_id == "providers/p/trips/t-1"));
}

#[test]
fn test_waypoint_ids_are_unique() {
    let trip = TripPayload::from_json(
        r#"{"tripName":"t","tripStatus":0,"remainingWaypoints":[
            {"location":{"lat":0.0,"lng":0.0}},{"location":{"lat":0.0,"lng":0.0}}]}"#,
    )
    .and_then(TripPayload::into_trip)
    .unwrap();

    assert_ne!(trip.waypoints()[0].id, trip.waypoints()[1].id);
    assert!(trip.waypoints()[0].id.to_string().starts_with("WPT_"));
}

#[test]
fn test_rejections_name_the_field() {
    let cases = [
        ("{", "$"),
        (r#"{"tripStatus":0,"remainingWaypoints":[]}"#, "tripName"),
        (r#"{"tripName":"","tripStatus":0}"#, "tripName"),
        (r#"{"tripName":"t","remainingWaypoints":[]}"#, "tripStatus"),
        (r#"{"tripName":"t","tripStatus":0}"#, "remainingWaypoints"),
        (r#"{"tripName":"t","tripStatus":0,"remainingWaypoints":[]}"#, "remainingWaypoints"),
        (r#"{"tripName":"t","tripStatus":0,"remainingWaypoints":[{}]}"#, "remainingWaypoints[0].location"),
        (
            r#"{"tripName":"t","tripStatus":0,"remainingWaypoints":[{"location":{"lat":1.0,"lng":1.0}},{"location":{"lat":1.0}}]}"#,
            "remainingWaypoints[1].location.lng",
        ),
    ];

    for (json, field) in cases {
        assert_eq!(reject(json).field(), field, "payload {}", json);
    }
}

#[test]
fn test_unknown_codes_rejected() {
    assert!(matches!(
        reject(r#"{"tripName":"t","tripStatus":42,"remainingWaypoints":[{"location":{"lat":1.0,"lng":1.0}}]}"#),
        TripValidationError::UnknownTripStatus(_)
    ));
    assert!(matches!(
        reject(
            r#"{"tripName":"t","tripStatus":0,"remainingWaypoints":[{"location":{"lat":1.0,"lng":1.0},"waypointType":7}]}"#
        ),
        TripValidationError::UnknownWaypointType { index: 0, .. }
    ));
}

#[test]
fn test_rejection_maps_to_invalid_trip_code() {
    let error: SimulationError = reject(r#"{"tripStatus":0}"#).into();
    assert_eq!(error.code(), "INVALID_TRIP");
    assert!(error.is_recoverable());
}

#[test]
fn test_serialized_trip_only_reenters_through_validation() {
    let trip = Trip::new(
        "round",
        TripStatus::EnrouteToDropoff,
        vec![Waypoint::with_default_title(Coordinate::new(37.42, -122.08), WaypointType::Dropoff, "round")],
        Trip::DEFAULT_VEHICLE_TYPE,
        "booking-1",
    )
    .unwrap();
    let json = serde_json::to_string(&trip).unwrap();

    let rebuilt = TripPayload::from_json(&json).and_then(TripPayload::into_trip).unwrap();
    assert_eq!(rebuilt.name(), trip.name());
    assert_eq!(rebuilt.status(), trip.status());
    assert_eq!(rebuilt.booking_id(), "booking-1");
    assert_eq!(rebuilt.waypoints()[0].location, trip.waypoints()[0].location);

    // Same shape as a serialized trip, but empty
    let empty = r#"{"tripName":"","tripStatus":0,"remainingWaypoints":[],"vehicleTypeId":"default","bookingId":""}"#;
    assert_eq!(reject(empty), TripValidationError::MissingTripName);
    let no_route = r#"{"tripName":"t","tripStatus":0,"remainingWaypoints":[],"vehicleTypeId":"default","bookingId":"t"}"#;
    assert_eq!(reject(no_route), TripValidationError::NoWaypoints);
}
