//! Trip, waypoint and coordinate types
//!
//! A [`Trip`] is built once through a validating constructor and afterwards only
//! its status changes, and only from inside a simulation session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::trip::TripValidationError;
use crate::types::{TripStatus, WaypointId, WaypointType};

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl Coordinate {
    /// Create a new coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// A stop along the trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    /// Identifier generated at creation
    pub id: WaypointId,
    /// Where the stop is
    pub location: Coordinate,
    /// Role of the stop
    pub waypoint_type: WaypointType,
    /// Identifier of the owning trip
    pub trip_id: String,
    /// Display title
    pub title: String,
}

impl Waypoint {
    /// Create a new waypoint with a fresh identifier
    pub fn new(
        location: Coordinate,
        waypoint_type: WaypointType,
        trip_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: WaypointId::new(),
            location,
            waypoint_type,
            trip_id: trip_id.into(),
            title: title.into(),
        }
    }

    /// Create a waypoint using the type's default title
    pub fn with_default_title(
        location: Coordinate,
        waypoint_type: WaypointType,
        trip_id: impl Into<String>,
    ) -> Self {
        Self::new(location, waypoint_type, trip_id, waypoint_type.default_title())
    }
}

/// A simulated journey: ordered waypoints plus a status.
///
/// Only built through [`Trip::new`]; it serializes for the feed but has no
/// `Deserialize`, so external data enters through `TripPayload`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    trip_name: String,
    trip_status: TripStatus,
    remaining_waypoints: Vec<Waypoint>,
    vehicle_type_id: String,
    booking_id: String,
}

impl Trip {
    /// Vehicle type used when the caller does not provide one
    pub const DEFAULT_VEHICLE_TYPE: &'static str = "default";

    /// Create a trip, rejecting an empty name, an empty route or non-finite coordinates
    pub fn new(
        trip_name: impl Into<String>,
        trip_status: TripStatus,
        remaining_waypoints: Vec<Waypoint>,
        vehicle_type_id: impl Into<String>,
        booking_id: impl Into<String>,
    ) -> Result<Self, TripValidationError> {
        let trip_name = trip_name.into();
        if trip_name.trim().is_empty() {
            return Err(TripValidationError::MissingTripName);
        }

        if remaining_waypoints.is_empty() {
            return Err(TripValidationError::NoWaypoints);
        }

        for (index, waypoint) in remaining_waypoints.iter().enumerate() {
            if !waypoint.location.lat.is_finite() {
                return Err(TripValidationError::InvalidCoordinate {
                    index,
                    field: "lat",
                    value: waypoint.location.lat,
                });
            }
            if !waypoint.location.lng.is_finite() {
                return Err(TripValidationError::InvalidCoordinate {
                    index,
                    field: "lng",
                    value: waypoint.location.lng,
                });
            }
        }

        Ok(Self {
            trip_name,
            trip_status,
            remaining_waypoints,
            vehicle_type_id: vehicle_type_id.into(),
            booking_id: booking_id.into(),
        })
    }

    /// Trip name, which doubles as the trip identifier
    pub fn name(&self) -> &str {
        &self.trip_name
    }

    /// Trip identifier
    pub fn id(&self) -> &str {
        &self.trip_name
    }

    /// Current status
    pub fn status(&self) -> TripStatus {
        self.trip_status
    }

    /// Ordered waypoints; the order is the route order
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.remaining_waypoints
    }

    /// Waypoint at the given route position
    pub fn waypoint(&self, index: usize) -> Option<&Waypoint> {
        self.remaining_waypoints.get(index)
    }

    /// Vehicle type identifier
    pub fn vehicle_type_id(&self) -> &str {
        &self.vehicle_type_id
    }

    /// Booking identifier
    pub fn booking_id(&self) -> &str {
        &self.booking_id
    }

    pub(crate) fn set_status(&mut self, status: TripStatus) {
        self.trip_status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pickup() -> Waypoint {
        Waypoint::with_default_title(Coordinate::new(37.422, -122.084), WaypointType::Pickup, "trip-1")
    }

    #[test]
    fn test_trip_creation() {
        let trip = Trip::new("trip-1", TripStatus::New, vec![pickup()], "sedan", "booking-9").unwrap();

        assert_eq!(trip.name(), "trip-1");
        assert_eq!(trip.id(), "trip-1");
        assert_eq!(trip.status(), TripStatus::New);
        assert_eq!(trip.waypoints().len(), 1);
        assert_eq!(trip.vehicle_type_id(), "sedan");
        assert_eq!(trip.booking_id(), "booking-9");
        assert_eq!(trip.waypoint(0).map(|w| w.title.as_str()), Some("Pickup"));
        assert!(trip.waypoint(1).is_none());
    }

    #[test]
    fn test_trip_rejects_empty_name() {
        let result = Trip::new("  ", TripStatus::New, vec![pickup()], "sedan", "b");
        assert!(matches!(result, Err(TripValidationError::MissingTripName)));
    }

    #[test]
    fn test_trip_rejects_empty_route() {
        let result = Trip::new("trip-1", TripStatus::New, Vec::new(), "sedan", "b");
        assert!(matches!(result, Err(TripValidationError::NoWaypoints)));
    }

    #[test]
    fn test_trip_rejects_non_finite_coordinates() {
        let mut bad = pickup();
        bad.location.lng = f64::INFINITY;

        let result = Trip::new("trip-1", TripStatus::New, vec![pickup(), bad], "sedan", "b");
        match result {
            Err(TripValidationError::InvalidCoordinate { index, field, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "lng");
            }
            other => panic!("Expected InvalidCoordinate, got {:?}", other),
        }
    }

    #[test]
    fn test_waypoint_ids_are_unique() {
        let a = pickup();
        let b = pickup();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_waypoint_serializes_in_bridge_shape() {
        let waypoint = Waypoint::new(
            Coordinate::new(1.5, 2.5),
            WaypointType::Intermediate,
            "trip-1",
            "Coffee stop",
        );
        let value = serde_json::to_value(&waypoint).unwrap();

        assert_eq!(value["location"]["lat"], 1.5);
        assert_eq!(value["location"]["lng"], 2.5);
        assert_eq!(value["waypointType"], 2);
        assert_eq!(value["tripId"], "trip-1");
        assert_eq!(value["title"], "Coffee stop");
        assert!(value["id"].as_str().unwrap().starts_with("WPT_"));
    }
}
