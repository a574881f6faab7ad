//! Trip status state machine
//!
//! Decides, after the vehicle reaches a waypoint, which status the trip moves to,
//! where the waypoint cursor goes next and how the distance/ETA horizon of the next
//! leg is reset. Only arrival ticks can change anything.
//!
//! | Reached        | Precondition            | Status              | Cursor | Distance | ETA      |
//! |----------------|-------------------------|---------------------|--------|----------|----------|
//! | `Pickup`       | distance >= departure   | `ArrivedAtPickup`   | same   | same     | same     |
//! | `Pickup`       | distance < departure    | `EnrouteToDropoff`  | +1     | 3000 m   | +20 min  |
//! | `Dropoff`      | -                       | `Completed`         | same   | 0        | same     |
//! | `Intermediate` | -                       | same                | +1     | 2000 m   | +10 min  |
//!
//! Leg resets after a cursor increment only apply when a next waypoint exists.

use chrono::Duration;

use crate::types::{SimulationTuning, TripStatus, WaypointType};

/// Everything the state machine looks at for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionInput {
    /// Status before the tick
    pub status: TripStatus,
    /// Whether the motion model reported arrival at the current target
    pub arrived: bool,
    /// Type of the waypoint at the cursor
    pub waypoint_type: WaypointType,
    /// Remaining distance after this tick's decay
    pub remaining_distance_meters: f64,
    /// Cursor before the tick
    pub cursor: usize,
    /// Number of waypoints in the route
    pub waypoint_count: usize,
}

/// Outcome of one state machine step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusTransition {
    /// Status after the tick
    pub status: TripStatus,
    /// Cursor after the tick
    pub cursor: usize,
    /// Remaining distance to overwrite, if any
    pub distance_reset: Option<f64>,
    /// New ETA horizon measured from now, if any
    pub eta_horizon: Option<Duration>,
}

impl StatusTransition {
    /// Transition that leaves status, cursor and leg untouched
    pub fn unchanged(input: &TransitionInput) -> Self {
        Self { status: input.status, cursor: input.cursor, distance_reset: None, eta_horizon: None }
    }
}

/// Status state machine parameterised by the leg constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusMachine {
    pickup_departure_distance_meters: f64,
    dropoff_leg_distance_meters: f64,
    dropoff_leg_eta: Duration,
    intermediate_leg_distance_meters: f64,
    intermediate_leg_eta: Duration,
}

impl Default for StatusMachine {
    fn default() -> Self {
        Self::from_tuning(&SimulationTuning::default())
    }
}

impl StatusMachine {
    /// Create a state machine from the simulation tuning
    pub fn from_tuning(tuning: &SimulationTuning) -> Self {
        Self {
            pickup_departure_distance_meters: tuning.pickup_departure_distance_meters,
            dropoff_leg_distance_meters: tuning.dropoff_leg_distance_meters,
            dropoff_leg_eta: tuning.dropoff_leg_eta(),
            intermediate_leg_distance_meters: tuning.intermediate_leg_distance_meters,
            intermediate_leg_eta: tuning.intermediate_leg_eta(),
        }
    }

    /// Compute the next status, cursor and leg resets
    pub fn transition(&self, input: TransitionInput) -> StatusTransition {
        if input.status.is_terminal() || !input.arrived {
            return StatusTransition::unchanged(&input);
        }

        match input.waypoint_type {
            WaypointType::Pickup => {
                if input.remaining_distance_meters < self.pickup_departure_distance_meters {
                    self.next_leg(
                        &input,
                        TripStatus::EnrouteToDropoff,
                        self.dropoff_leg_distance_meters,
                        self.dropoff_leg_eta,
                    )
                } else {
                    StatusTransition { status: TripStatus::ArrivedAtPickup, ..StatusTransition::unchanged(&input) }
                }
            }
            WaypointType::Dropoff => StatusTransition {
                status: TripStatus::Completed,
                cursor: input.cursor,
                distance_reset: Some(0.0),
                eta_horizon: None,
            },
            WaypointType::Intermediate => self.next_leg(
                &input,
                input.status,
                self.intermediate_leg_distance_meters,
                self.intermediate_leg_eta,
            ),
        }
    }

    fn next_leg(
        &self,
        input: &TransitionInput,
        status: TripStatus,
        leg_distance_meters: f64,
        leg_eta: Duration,
    ) -> StatusTransition {
        let cursor = (input.cursor + 1).min(input.waypoint_count);
        let has_next_leg = cursor < input.waypoint_count;

        StatusTransition {
            status,
            cursor,
            distance_reset: has_next_leg.then_some(leg_distance_meters),
            eta_horizon: has_next_leg.then_some(leg_eta),
        }
    }
}
