//! Simulation engine and control
//!
//! This module contains the tick engine, the scheduler that drives it, the
//! orchestrator that owns the running session, statistics and error handling.
//!
//! # Overview
//!
//! - **MotionModel**: moves the vehicle toward its target and detects arrival
//! - **StatusMachine**: decides status, cursor and leg resets on arrival
//! - **SimulationSession**: live state of one trip, changed only by `advance`
//! - **Scheduler**: worker thread that ticks a session and publishes the feed
//! - **SimulationOrchestrator**: start/stop/cleanup control surface
//! - **FeedStatistics**: tick and event counters
//! - **SimulationError**: errors with stable bridge codes
//!
//! # Usage Example
//!
//! ```rust
//! use journey_sharing_simulator::simulation::*;
//! use journey_sharing_simulator::trip::*;
//! use journey_sharing_simulator::types::*;
//! use chrono::{Duration, Utc};
//!
//! let trip = TripPayload {
//!     trip_name: Some("trip-1".to_string()),
//!     trip_status: Some(TripStatus::EnrouteToPickup.into()),
//!     remaining_waypoints: vec![WaypointPayload::at(37.422, -122.084, WaypointType::Pickup)],
//!     ..Default::default()
//! }
//! .into_trip()?;
//!
//! let now = Utc::now();
//! let mut session = SimulationSession::create_at(trip, SimulationTuning::default(), now);
//! let outcome = session.advance_at(now + Duration::seconds(2));
//!
//! assert!(outcome.arrived);
//! assert_eq!(session.status(), TripStatus::ArrivedAtPickup);
//! assert_eq!(session.remaining_distance_meters(), 2_450.0);
//! # Ok::<(), TripValidationError>(())
//! ```

pub mod error;
pub mod logging;
pub mod motion;
pub mod orchestrator;
pub mod scheduler;
pub mod session;
pub mod statistics;
pub mod status;

// Re-export all public types for convenience
pub use error::*;
pub use logging::*;
pub use motion::*;
pub use orchestrator::*;
pub use scheduler::*;
pub use session::*;
pub use statistics::*;
pub use status::*;
