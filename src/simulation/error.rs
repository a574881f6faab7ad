//! Error types and handling
//!
//! This module contains the error type surfaced by the simulation control
//! operations. Every variant maps onto a stable bridge error code.

use std::any::Any;
use thiserror::Error;

use crate::trip::TripValidationError;
use crate::types::ConfigValidationError;

/// Errors that can occur during simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A session is already running
    #[error("A simulation session is already active for trip '{0}'")]
    SessionActive(String),

    /// No session is running
    #[error("No active simulation session")]
    NoSession,

    /// The start payload was rejected
    #[error("Invalid trip: {0}")]
    InvalidTrip(#[from] TripValidationError),

    /// A tick failed while the scheduler was running
    #[error("Internal simulation error: {0}")]
    Internal(String),

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Configuration(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::Configuration(error.to_string())
    }
}

impl SimulationError {
    /// Create a session-active error for the running trip
    pub fn session_active(trip_name: impl Into<String>) -> Self {
        Self::SessionActive(trip_name.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Error code reported to the host bridge
    pub fn code(&self) -> &'static str {
        match self {
            SimulationError::SessionActive(_) => "SESSION_ACTIVE",
            SimulationError::NoSession => "NO_SESSION",
            SimulationError::InvalidTrip(_) => "INVALID_TRIP",
            SimulationError::Internal(_) => "INTERNAL",
            SimulationError::Configuration(_) => "CONFIGURATION",
            SimulationError::Io(_) => "IO",
            SimulationError::Serialization(_) => "SERIALIZATION",
        }
    }

    /// Check if the caller can carry on after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::SessionActive(_) => true,
            SimulationError::NoSession => true,
            SimulationError::InvalidTrip(_) => true,
            SimulationError::Internal(_) => true,
            SimulationError::Configuration(_) => false,
            SimulationError::Io(_) => false,
            SimulationError::Serialization(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::SessionActive(_) | SimulationError::NoSession => "Session Control",
            SimulationError::InvalidTrip(_) => "Trip Validation",
            SimulationError::Internal(_) => "Scheduler",
            SimulationError::Configuration(_) => "Configuration",
            SimulationError::Io(_) => "IO",
            SimulationError::Serialization(_) => "Serialization",
        }
    }
}

impl SimulationError {
    /// Internal error for a panic caught while running `context`
    pub fn from_panic(context: &str, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            format!("{} panicked: {}", context, message)
        } else if let Some(message) = payload.downcast_ref::<String>() {
            format!("{} panicked: {}", context, message)
        } else {
            format!("{} panicked", context)
        };
        SimulationError::Internal(message)
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;
