//! Enumeration types for the journey sharing simulator
//!
//! This module contains the trip status and waypoint type enumerations. Both
//! carry the integer codes used by the host bridge and serialize as those codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a simulated trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TripStatus {
    /// Trip has been created but no vehicle is moving yet
    New,
    /// Vehicle is heading toward the pickup waypoint
    EnrouteToPickup,
    /// Vehicle is waiting at the pickup waypoint
    ArrivedAtPickup,
    /// Vehicle has left the pickup and is heading to the dropoff
    EnrouteToDropoff,
    /// Vehicle reached the dropoff waypoint
    Completed,
    /// Trip was canceled by someone outside the simulation
    Canceled,
}

impl TripStatus {
    /// All statuses in code order
    pub const ALL: [TripStatus; 6] = [
        TripStatus::New,
        TripStatus::EnrouteToPickup,
        TripStatus::ArrivedAtPickup,
        TripStatus::EnrouteToDropoff,
        TripStatus::Completed,
        TripStatus::Canceled,
    ];

    /// Integer code used on the wire
    pub fn code(self) -> u8 {
        match self {
            TripStatus::New => 0,
            TripStatus::EnrouteToPickup => 1,
            TripStatus::ArrivedAtPickup => 2,
            TripStatus::EnrouteToDropoff => 3,
            TripStatus::Completed => 4,
            TripStatus::Canceled => 5,
        }
    }

    /// Look up a status by its wire code
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|status| i64::from(status.code()) == code)
    }

    /// Whether the simulation stops advancing in this status
    pub fn is_terminal(self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Canceled)
    }
}

impl From<TripStatus> for u8 {
    fn from(status: TripStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for TripStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        TripStatus::from_code(i64::from(code)).ok_or_else(|| format!("Unknown trip status code: {}", code))
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripStatus::New => write!(f, "NEW"),
            TripStatus::EnrouteToPickup => write!(f, "ENROUTE_TO_PICKUP"),
            TripStatus::ArrivedAtPickup => write!(f, "ARRIVED_AT_PICKUP"),
            TripStatus::EnrouteToDropoff => write!(f, "ENROUTE_TO_DROPOFF"),
            TripStatus::Completed => write!(f, "COMPLETED"),
            TripStatus::Canceled => write!(f, "CANCELED"),
        }
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "new" => Ok(TripStatus::New),
            "enroute_to_pickup" => Ok(TripStatus::EnrouteToPickup),
            "arrived_at_pickup" => Ok(TripStatus::ArrivedAtPickup),
            "enroute_to_dropoff" => Ok(TripStatus::EnrouteToDropoff),
            "completed" => Ok(TripStatus::Completed),
            "canceled" | "cancelled" => Ok(TripStatus::Canceled),
            _ => Err(format!("Unknown trip status: {}", s)),
        }
    }
}

/// Role of a waypoint along the route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum WaypointType {
    /// Where the rider or parcel is collected
    Pickup,
    /// Final destination of the trip
    Dropoff,
    /// Stop between pickup and dropoff
    Intermediate,
}

impl WaypointType {
    /// Integer code used on the wire
    pub fn code(self) -> u8 {
        match self {
            WaypointType::Pickup => 0,
            WaypointType::Dropoff => 1,
            WaypointType::Intermediate => 2,
        }
    }

    /// Look up a waypoint type by its wire code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(WaypointType::Pickup),
            1 => Some(WaypointType::Dropoff),
            2 => Some(WaypointType::Intermediate),
            _ => None,
        }
    }

    /// Title shown for a waypoint when the caller does not provide one
    pub fn default_title(self) -> &'static str {
        match self {
            WaypointType::Pickup => "Pickup",
            WaypointType::Dropoff => "Dropoff",
            WaypointType::Intermediate => "Stop",
        }
    }
}

impl Default for WaypointType {
    fn default() -> Self {
        WaypointType::Pickup
    }
}

impl From<WaypointType> for u8 {
    fn from(waypoint_type: WaypointType) -> Self {
        waypoint_type.code()
    }
}

impl TryFrom<u8> for WaypointType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        WaypointType::from_code(i64::from(code))
            .ok_or_else(|| format!("Unknown waypoint type code: {}", code))
    }
}

impl fmt::Display for WaypointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaypointType::Pickup => write!(f, "PICKUP"),
            WaypointType::Dropoff => write!(f, "DROPOFF"),
            WaypointType::Intermediate => write!(f, "INTERMEDIATE"),
        }
    }
}

impl FromStr for WaypointType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pickup" => Ok(WaypointType::Pickup),
            "dropoff" => Ok(WaypointType::Dropoff),
            "intermediate" | "stop" => Ok(WaypointType::Intermediate),
            _ => Err(format!("Unknown waypoint type: {}", s)),
        }
    }
}
