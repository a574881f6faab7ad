//! Start payload and its validation
//!
//! The host hands over a loosely-typed trip description where most fields are
//! optional. [`TripPayload::into_trip`] is the single place where defaults are
//! filled in and malformed input is rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::trip::{Coordinate, Trip, Waypoint};
use crate::types::{TripStatus, WaypointType};

/// Reasons a start payload cannot become a [`Trip`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TripValidationError {
    /// Payload is not valid JSON or has the wrong shape
    #[error("Malformed trip payload: {0}")]
    Malformed(String),

    /// Trip name is absent or blank
    #[error("Trip name is required")]
    MissingTripName,

    /// Trip status is absent
    #[error("Trip status is required")]
    MissingTripStatus,

    /// Trip status is not one of the known codes or names
    #[error("Unknown trip status: {0}")]
    UnknownTripStatus(String),

    /// Route has no waypoints
    #[error("At least one waypoint is required")]
    NoWaypoints,

    /// A waypoint has no location
    #[error("Waypoint {index} has no location")]
    MissingLocation {
        /// Position of the waypoint in the route
        index: usize,
    },

    /// A waypoint location is missing a component
    #[error("Waypoint {index} location is missing {field}")]
    MissingCoordinate {
        /// Position of the waypoint in the route
        index: usize,
        /// Missing component
        field: &'static str,
    },

    /// A waypoint location component is not a finite number
    #[error("Waypoint {index} has invalid {field}: {value}")]
    InvalidCoordinate {
        /// Position of the waypoint in the route
        index: usize,
        /// Offending component
        field: &'static str,
        /// Offending value
        value: f64,
    },

    /// A waypoint type is not one of the known codes or names
    #[error("Waypoint {index} has unknown waypoint type: {value}")]
    UnknownWaypointType {
        /// Position of the waypoint in the route
        index: usize,
        /// Offending value
        value: String,
    },
}

impl TripValidationError {
    /// Path of the payload field that failed validation
    pub fn field(&self) -> String {
        match self {
            TripValidationError::Malformed(_) => "$".to_string(),
            TripValidationError::MissingTripName => "tripName".to_string(),
            TripValidationError::MissingTripStatus | TripValidationError::UnknownTripStatus(_) => {
                "tripStatus".to_string()
            }
            TripValidationError::NoWaypoints => "remainingWaypoints".to_string(),
            TripValidationError::MissingLocation { index } => {
                format!("remainingWaypoints[{}].location", index)
            }
            TripValidationError::MissingCoordinate { index, field }
            | TripValidationError::InvalidCoordinate { index, field, .. } => {
                format!("remainingWaypoints[{}].location.{}", index, field)
            }
            TripValidationError::UnknownWaypointType { index, .. } => {
                format!("remainingWaypoints[{}].waypointType", index)
            }
        }
    }
}

/// Enum field given either as its wire code or by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeOrName {
    /// Integer wire code
    Code(i64),
    /// Name such as `"ENROUTE_TO_PICKUP"` or `"dropoff"`
    Name(String),
}

impl From<TripStatus> for CodeOrName {
    fn from(status: TripStatus) -> Self {
        CodeOrName::Code(i64::from(status.code()))
    }
}

impl From<WaypointType> for CodeOrName {
    fn from(waypoint_type: WaypointType) -> Self {
        CodeOrName::Code(i64::from(waypoint_type.code()))
    }
}

impl CodeOrName {
    fn describe(&self) -> String {
        match self {
            CodeOrName::Code(code) => code.to_string(),
            CodeOrName::Name(name) => name.clone(),
        }
    }

    fn to_trip_status(&self) -> Option<TripStatus> {
        match self {
            CodeOrName::Code(code) => TripStatus::from_code(*code),
            CodeOrName::Name(name) => name.parse().ok(),
        }
    }

    fn to_waypoint_type(&self) -> Option<WaypointType> {
        match self {
            CodeOrName::Code(code) => WaypointType::from_code(*code),
            CodeOrName::Name(name) => name.parse().ok(),
        }
    }
}

/// Location as sent by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationPayload {
    /// Latitude in degrees
    pub lat: Option<f64>,
    /// Longitude in degrees
    pub lng: Option<f64>,
}

/// Waypoint as sent by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointPayload {
    /// Required location
    pub location: Option<LocationPayload>,
    /// Waypoint type, PICKUP when absent
    pub waypoint_type: Option<CodeOrName>,
    /// Owning trip, the trip name when absent
    pub trip_id: Option<String>,
    /// Display title, derived from the type when absent
    pub title: Option<String>,
}

impl WaypointPayload {
    /// Waypoint payload with a location and type and no other fields
    pub fn at(lat: f64, lng: f64, waypoint_type: WaypointType) -> Self {
        Self {
            location: Some(LocationPayload { lat: Some(lat), lng: Some(lng) }),
            waypoint_type: Some(waypoint_type.into()),
            ..Default::default()
        }
    }
}

/// Start payload as sent by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPayload {
    /// Required trip name, also used as the trip identifier
    pub trip_name: Option<String>,
    /// Required initial status
    pub trip_status: Option<CodeOrName>,
    /// Ordered route; must contain at least one waypoint
    #[serde(default)]
    pub remaining_waypoints: Vec<WaypointPayload>,
    /// Vehicle type, `"default"` when absent
    pub vehicle_type_id: Option<String>,
    /// Booking identifier, the trip name when absent
    pub booking_id: Option<String>,
}

impl TripPayload {
    /// Parse a payload from JSON text
    pub fn from_json(json: &str) -> Result<Self, TripValidationError> {
        serde_json::from_str(json).map_err(|e| TripValidationError::Malformed(e.to_string()))
    }

    /// Validate the payload and build a [`Trip`], applying defaults for optional fields
    pub fn into_trip(self) -> Result<Trip, TripValidationError> {
        let trip_name = match self.trip_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(TripValidationError::MissingTripName),
        };

        let status_field = self.trip_status.ok_or(TripValidationError::MissingTripStatus)?;
        let trip_status = status_field
            .to_trip_status()
            .ok_or_else(|| TripValidationError::UnknownTripStatus(status_field.describe()))?;

        if self.remaining_waypoints.is_empty() {
            return Err(TripValidationError::NoWaypoints);
        }

        let waypoints = self
            .remaining_waypoints
            .into_iter()
            .enumerate()
            .map(|(index, waypoint)| build_waypoint(index, waypoint, &trip_name))
            .collect::<Result<Vec<_>, _>>()?;

        let vehicle_type_id =
            self.vehicle_type_id.unwrap_or_else(|| Trip::DEFAULT_VEHICLE_TYPE.to_string());
        let booking_id = self.booking_id.unwrap_or_else(|| trip_name.clone());

        debug!(
            "Validated trip '{}' with {} waypoints, status {}",
            trip_name,
            waypoints.len(),
            trip_status
        );

        Trip::new(trip_name, trip_status, waypoints, vehicle_type_id, booking_id)
    }
}

fn build_waypoint(
    index: usize,
    payload: WaypointPayload,
    trip_name: &str,
) -> Result<Waypoint, TripValidationError> {
    let location = payload.location.ok_or(TripValidationError::MissingLocation { index })?;
    let lat = location.lat.ok_or(TripValidationError::MissingCoordinate { index, field: "lat" })?;
    let lng = location.lng.ok_or(TripValidationError::MissingCoordinate { index, field: "lng" })?;

    if !lat.is_finite() {
        return Err(TripValidationError::InvalidCoordinate { index, field: "lat", value: lat });
    }
    if !lng.is_finite() {
        return Err(TripValidationError::InvalidCoordinate { index, field: "lng", value: lng });
    }

    let waypoint_type = match payload.waypoint_type {
        None => WaypointType::default(),
        Some(field) => field.to_waypoint_type().ok_or_else(|| {
            TripValidationError::UnknownWaypointType { index, value: field.describe() }
        })?,
    };

    let trip_id = payload.trip_id.unwrap_or_else(|| trip_name.to_string());
    let title = payload.title.unwrap_or_else(|| waypoint_type.default_title().to_string());

    Ok(Waypoint::new(Coordinate::new(lat, lng), waypoint_type, trip_id, title))
}
