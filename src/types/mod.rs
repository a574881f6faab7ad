//! Core types and identifiers for the journey sharing simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: UUID-based unique identifiers for waypoints
//! - **Enums**: Trip statuses and waypoint types with their wire codes
//! - **Configuration**: Simulation tuning with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use journey_sharing_simulator::types::*;
//!
//! let waypoint_id = WaypointId::new();
//! assert!(waypoint_id.to_string().starts_with("WPT_"));
//!
//! assert!(TripStatus::Completed.is_terminal());
//! assert_eq!(WaypointType::Dropoff.code(), 1);
//!
//! let config = SimulationConfig {
//!     tick_interval_ms: 500,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
