//! Journey Sharing Simulator
//!
//! A trip simulation engine that drives a journey-sharing feed: a simulated
//! vehicle moves along a trip's waypoints while status, location, ETA and
//! remaining distance updates are published on a fixed tick.
//!
//! # Overview
//!
//! The engine stands in for a real fleet backend when testing a trip-sharing
//! consumer. A host hands it a trip payload; it validates the payload, starts a
//! single session and publishes four events per tick until it is stopped.
//!
//! ## Key Features
//!
//! - **Validated trip boundary**: loosely-typed payloads become a `Trip` or a structured error
//! - **Deterministic engine**: motion and status logic take an explicit instant
//! - **Cancellable scheduler**: no event is published after `stop` returns
//! - **Publish/subscribe feed**: listeners with unsubscribe handles
//! - **Configurable tuning**: every heuristic constant is a configuration default
//!
//! ## Quick Start
//!
//! ```rust
//! use journey_sharing_simulator::*;
//! use journey_sharing_simulator::trip::WaypointPayload;
//!
//! let orchestrator = SimulationOrchestrator::new(SimulationConfig {
//!     tick_interval_ms: 50,
//!     ..Default::default()
//! })?;
//!
//! let subscription = orchestrator.subscribe(|event| println!("{}", event.name()));
//!
//! orchestrator.start(TripPayload {
//!     trip_name: Some("trip-1".to_string()),
//!     trip_status: Some(TripStatus::New.into()),
//!     remaining_waypoints: vec![
//!         WaypointPayload::at(37.422, -122.084, WaypointType::Pickup),
//!         WaypointPayload::at(37.420, -122.090, WaypointType::Dropoff),
//!     ],
//!     ..Default::default()
//! })?;
//!
//! let stats = orchestrator.stop()?;
//! subscription.unsubscribe();
//! println!("{}", stats.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Enums, identifiers and configuration
//! - [`trip`]: Trip model and the validating start payload
//! - [`events`]: Feed events and the event bus
//! - [`simulation`]: Engine, scheduler, orchestrator and statistics
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌──────────────┐
//! │   Types     │    │    Trip     │    │  Simulation  │
//! │             │    │             │    │              │
//! │ Enums       │◄───┤ Model       │◄───┤ Session      │
//! │ Identifiers │    │ Payload     │    │ Scheduler    │
//! │ Config      │    │             │    │ Orchestrator │
//! └─────────────┘    └─────────────┘    └──────────────┘
//!                           ▲                   │
//!                           │                   ▼
//!                    ┌─────────────┐            │
//!                    │   Events    │◄───────────┘
//!                    │ Feed / Bus  │
//!                    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod events;
pub mod simulation;
pub mod trip;
pub mod types;

// Core types and configuration
pub use types::{
    ConfigError, ConfigValidationError, SimulationConfig, SimulationTuning, TripStatus, WaypointId,
    WaypointType,
};

// Trip model
pub use trip::{Coordinate, Trip, TripPayload, TripValidationError, Waypoint};

// Feed events
pub use events::{EventBus, FeedEvent, FeedEventKind, Subscription, TripSnapshot, VehicleLocationPayload};

// Simulation types and functionality
pub use simulation::{
    FeedStatistics, LoggingConfig, Scheduler, SchedulerHandle, SimulationError,
    SimulationOrchestrator, SimulationResult, SimulationSession, TickOutcome, VehicleTelemetry,
};
