//! Trip feed events and their delivery
//!
//! # Overview
//!
//! - **FeedEvent**: the four updates published after every tick
//! - **TripSnapshot**: trip id, status and waypoint list attached to each update
//! - **EventBus / Subscription**: publish-subscribe hub with unsubscribe handles
//!
//! # Usage Example
//!
//! ```rust
//! use journey_sharing_simulator::events::*;
//! use journey_sharing_simulator::simulation::SimulationSession;
//! use journey_sharing_simulator::trip::*;
//! use journey_sharing_simulator::types::{TripStatus, WaypointType};
//! use std::sync::{Arc, Mutex};
//!
//! let trip = Trip::new(
//!     "trip-1",
//!     TripStatus::New,
//!     vec![Waypoint::with_default_title(Coordinate::new(37.42, -122.08), WaypointType::Pickup, "trip-1")],
//!     Trip::DEFAULT_VEHICLE_TYPE,
//!     "trip-1",
//! )?;
//!
//! let bus = EventBus::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let subscription = bus.subscribe(move |event| sink.lock().unwrap().push(event.name()));
//!
//! for event in FeedEvent::for_tick(&SimulationSession::create(trip).snapshot()).iter() {
//!     bus.publish(event);
//! }
//! subscription.unsubscribe();
//!
//! assert_eq!(seen.lock().unwrap()[1], "onTripVehicleLocationUpdated");
//! # Ok::<(), TripValidationError>(())
//! ```

pub mod bus;
pub mod feed_event;

pub use bus::*;
pub use feed_event::*;
