//! Feed events
//!
//! This module contains the four update events published after every tick and
//! the trip snapshot each of them carries.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::simulation::{SessionSnapshot, VehicleTelemetry};
use crate::trip::{Trip, Waypoint};
use crate::types::TripStatus;

/// Kind of feed event, in publish order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedEventKind {
    /// Trip status changed or was re-announced
    TripStatusUpdated,
    /// Vehicle position update
    VehicleLocationUpdated,
    /// ETA to the next waypoint update
    EtaToNextWaypointUpdated,
    /// Remaining distance on the active route update
    RemainingDistanceUpdated,
}

impl FeedEventKind {
    /// All kinds in the order they are published within a tick
    pub const ALL: [FeedEventKind; 4] = [
        FeedEventKind::TripStatusUpdated,
        FeedEventKind::VehicleLocationUpdated,
        FeedEventKind::EtaToNextWaypointUpdated,
        FeedEventKind::RemainingDistanceUpdated,
    ];

    /// Event name used by the host bridge
    pub fn name(&self) -> &'static str {
        match self {
            FeedEventKind::TripStatusUpdated => "onTripStatusUpdated",
            FeedEventKind::VehicleLocationUpdated => "onTripVehicleLocationUpdated",
            FeedEventKind::EtaToNextWaypointUpdated => "onTripETAToNextWaypointUpdated",
            FeedEventKind::RemainingDistanceUpdated => "onTripActiveRouteRemainingDistanceUpdated",
        }
    }
}

impl fmt::Display for FeedEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trip information attached to every feed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    /// Trip identifier
    pub trip_id: String,
    /// Status at publish time
    pub trip_status: TripStatus,
    /// Full waypoint list of the trip
    pub remaining_waypoints: Vec<Waypoint>,
}

impl From<&Trip> for TripSnapshot {
    fn from(trip: &Trip) -> Self {
        Self {
            trip_id: trip.id().to_string(),
            trip_status: trip.status(),
            remaining_waypoints: trip.waypoints().to_vec(),
        }
    }
}

/// Vehicle location in the shape the host bridge expects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleLocationPayload {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Heading in degrees
    pub heading: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl From<&VehicleTelemetry> for VehicleLocationPayload {
    fn from(telemetry: &VehicleTelemetry) -> Self {
        Self {
            latitude: telemetry.location.lat,
            longitude: telemetry.location.lng,
            heading: telemetry.heading,
            timestamp: telemetry.timestamp_millis(),
        }
    }
}

/// One update on the trip feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum FeedEvent {
    /// Trip status as a numeric code
    #[serde(rename = "onTripStatusUpdated")]
    TripStatusUpdated {
        /// Trip snapshot
        trip: TripSnapshot,
        /// Current status
        status: TripStatus,
    },
    /// Vehicle position, heading and timestamp
    #[serde(rename = "onTripVehicleLocationUpdated")]
    VehicleLocationUpdated {
        /// Trip snapshot
        trip: TripSnapshot,
        /// Vehicle location
        location: VehicleLocationPayload,
    },
    /// ETA as epoch milliseconds
    #[serde(rename = "onTripETAToNextWaypointUpdated")]
    EtaToNextWaypointUpdated {
        /// Trip snapshot
        trip: TripSnapshot,
        /// Estimated arrival, epoch milliseconds
        eta: i64,
    },
    /// Remaining distance in meters
    #[serde(rename = "onTripActiveRouteRemainingDistanceUpdated")]
    RemainingDistanceUpdated {
        /// Trip snapshot
        trip: TripSnapshot,
        /// Remaining distance in meters
        #[serde(rename = "remainingDistanceMeters")]
        remaining_distance_meters: f64,
    },
}

impl FeedEvent {
    /// Build the events for one tick, in publish order
    pub fn for_tick(snapshot: &SessionSnapshot) -> [FeedEvent; 4] {
        let trip = TripSnapshot::from(&snapshot.trip);
        [
            FeedEvent::TripStatusUpdated { trip: trip.clone(), status: snapshot.status },
            FeedEvent::VehicleLocationUpdated {
                trip: trip.clone(),
                location: VehicleLocationPayload::from(&snapshot.telemetry),
            },
            FeedEvent::EtaToNextWaypointUpdated {
                trip: trip.clone(),
                eta: snapshot.eta.timestamp_millis(),
            },
            FeedEvent::RemainingDistanceUpdated {
                trip,
                remaining_distance_meters: snapshot.remaining_distance_meters,
            },
        ]
    }

    /// Kind of this event
    pub fn kind(&self) -> FeedEventKind {
        match self {
            FeedEvent::TripStatusUpdated { .. } => FeedEventKind::TripStatusUpdated,
            FeedEvent::VehicleLocationUpdated { .. } => FeedEventKind::VehicleLocationUpdated,
            FeedEvent::EtaToNextWaypointUpdated { .. } => FeedEventKind::EtaToNextWaypointUpdated,
            FeedEvent::RemainingDistanceUpdated { .. } => FeedEventKind::RemainingDistanceUpdated,
        }
    }

    /// Event name used by the host bridge
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Trip snapshot carried by this event
    pub fn trip(&self) -> &TripSnapshot {
        match self {
            FeedEvent::TripStatusUpdated { trip, .. }
            | FeedEvent::VehicleLocationUpdated { trip, .. }
            | FeedEvent::EtaToNextWaypointUpdated { trip, .. }
            | FeedEvent::RemainingDistanceUpdated { trip, .. } => trip,
        }
    }

    /// Whether every number in the payload is finite
    pub fn is_finite(&self) -> bool {
        match self {
            FeedEvent::TripStatusUpdated { .. } | FeedEvent::EtaToNextWaypointUpdated { .. } => true,
            FeedEvent::VehicleLocationUpdated { location, .. } => {
                location.latitude.is_finite()
                    && location.longitude.is_finite()
                    && location.heading.is_finite()
            }
            FeedEvent::RemainingDistanceUpdated { remaining_distance_meters, .. } => {
                remaining_distance_meters.is_finite()
            }
        }
    }
}
