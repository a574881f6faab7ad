//! Trip model
//!
//! This module contains the trip description the simulation runs on and the
//! validating boundary that turns a host payload into it.
//!
//! # Overview
//!
//! - **Coordinate / Waypoint / Trip**: the immutable-shape description of a journey
//! - **TripPayload**: the loosely-typed start payload with optional fields
//! - **TripValidationError**: structured rejection naming the failing field
//!
//! # Usage Example
//!
//! ```rust
//! use journey_sharing_simulator::trip::*;
//! use journey_sharing_simulator::types::{TripStatus, WaypointType};
//!
//! let payload = TripPayload {
//!     trip_name: Some("trip-1".to_string()),
//!     trip_status: Some(TripStatus::New.into()),
//!     remaining_waypoints: vec![
//!         WaypointPayload::at(37.422, -122.084, WaypointType::Pickup),
//!         WaypointPayload::at(37.420, -122.090, WaypointType::Dropoff),
//!     ],
//!     ..Default::default()
//! };
//!
//! let trip = payload.into_trip()?;
//! assert_eq!(trip.booking_id(), "trip-1");
//! assert_eq!(trip.waypoints()[1].title, "Dropoff");
//! # Ok::<(), TripValidationError>(())
//! ```

pub mod model;
pub mod payload;

pub use model::*;
pub use payload::*;
