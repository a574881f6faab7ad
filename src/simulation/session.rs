//! Simulation session
//!
//! A [`SimulationSession`] owns the live state of one simulated trip: vehicle
//! telemetry, status, waypoint cursor, remaining distance and ETA. The only way
//! to change that state is [`SimulationSession::advance`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::simulation::{MotionModel, StatusMachine, TransitionInput, VehicleTelemetry};
use crate::trip::{Coordinate, Trip, Waypoint};
use crate::types::{SimulationTuning, TripStatus};

/// What a single advance did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// False when the session was already terminal and nothing changed
    pub advanced: bool,
    /// Whether the vehicle reached its target on this tick
    pub arrived: bool,
    /// Status before the tick
    pub status_before: TripStatus,
    /// Status after the tick
    pub status_after: TripStatus,
}

impl TickOutcome {
    fn no_op(status: TripStatus) -> Self {
        Self { advanced: false, arrived: false, status_before: status, status_after: status }
    }

    /// Whether the tick moved the trip to another status
    pub fn status_changed(&self) -> bool {
        self.status_before != self.status_after
    }
}

/// Point-in-time copy of a session, safe to hand to other threads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Trip with its current status
    pub trip: Trip,
    /// Vehicle telemetry
    pub telemetry: VehicleTelemetry,
    /// Current status
    pub status: TripStatus,
    /// Index of the current target waypoint
    pub cursor: usize,
    /// Remaining distance in meters
    pub remaining_distance_meters: f64,
    /// Estimated arrival at the next waypoint
    pub eta: DateTime<Utc>,
}

/// Live state of one simulated trip
#[derive(Debug, Clone)]
pub struct SimulationSession {
    trip: Trip,
    telemetry: VehicleTelemetry,
    status: TripStatus,
    cursor: usize,
    remaining_distance_meters: f64,
    eta: DateTime<Utc>,
    tuning: SimulationTuning,
    motion: MotionModel,
    status_machine: StatusMachine,
}

impl SimulationSession {
    /// Create a session with default tuning, seeded at the current time
    pub fn create(trip: Trip) -> Self {
        Self::create_at(trip, SimulationTuning::default(), Utc::now())
    }

    /// Create a session with explicit tuning, seeded at the current time
    pub fn with_tuning(trip: Trip, tuning: SimulationTuning) -> Self {
        Self::create_at(trip, tuning, Utc::now())
    }

    /// Create a session seeded at `now`.
    ///
    /// The vehicle starts on the first waypoint facing north. Remaining distance
    /// and ETA start from fixed values regardless of waypoint spacing.
    #[instrument(skip(trip, tuning), fields(trip = %trip.name(), waypoints = trip.waypoints().len()))]
    pub fn create_at(trip: Trip, tuning: SimulationTuning, now: DateTime<Utc>) -> Self {
        let start = trip.waypoints().first().map_or(Coordinate::default(), |waypoint| waypoint.location);
        let status = trip.status();

        debug!("Creating simulation session at {} with status {}", start, status);

        Self {
            telemetry: VehicleTelemetry::at_rest(start, now),
            status,
            cursor: 0,
            remaining_distance_meters: tuning.initial_distance_meters,
            eta: now + tuning.initial_eta(),
            motion: MotionModel::from_tuning(&tuning),
            status_machine: StatusMachine::from_tuning(&tuning),
            tuning,
            trip,
        }
    }

    /// Advance the simulation by one tick at the current time
    pub fn advance(&mut self) -> TickOutcome {
        self.advance_at(Utc::now())
    }

    /// Advance the simulation by one tick at `now`
    pub fn advance_at(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let status_before = self.status;
        if status_before.is_terminal() {
            return TickOutcome::no_op(status_before);
        }

        self.remaining_distance_meters =
            (self.remaining_distance_meters - self.tuning.distance_decay_meters).max(0.0);
        self.eta = self.decayed_eta(now);

        let mut arrived = false;
        match self.trip.waypoint(self.cursor).cloned() {
            Some(target) => {
                let step = self.motion.step(&self.telemetry, target.location, now);
                self.telemetry = step.telemetry;
                arrived = step.arrived;

                if arrived {
                    self.apply_arrival(&target, now);
                }
            }
            None => {
                self.telemetry = VehicleTelemetry { timestamp: now, ..self.telemetry };
            }
        }

        self.trip.set_status(self.status);

        trace!(
            status = %self.status,
            cursor = self.cursor,
            remaining_distance_meters = self.remaining_distance_meters,
            "Advanced session"
        );

        TickOutcome { advanced: true, arrived, status_before, status_after: self.status }
    }

    fn decayed_eta(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let remaining = (self.eta - now).max(Duration::zero());
        let decayed_ms = (remaining.num_milliseconds() as f64 * self.tuning.eta_decay_factor) as i64;
        let decayed = Duration::milliseconds(decayed_ms).max(self.tuning.min_eta());
        now + decayed
    }

    fn apply_arrival(&mut self, target: &Waypoint, now: DateTime<Utc>) {
        let transition = self.status_machine.transition(TransitionInput {
            status: self.status,
            arrived: true,
            waypoint_type: target.waypoint_type,
            remaining_distance_meters: self.remaining_distance_meters,
            cursor: self.cursor,
            waypoint_count: self.trip.waypoints().len(),
        });

        if transition.status != self.status || transition.cursor != self.cursor {
            debug!(
                "Reached {} waypoint '{}': {} -> {}, cursor {} -> {}",
                target.waypoint_type,
                target.title,
                self.status,
                transition.status,
                self.cursor,
                transition.cursor
            );
        }

        self.status = transition.status;
        self.cursor = transition.cursor;
        if let Some(distance) = transition.distance_reset {
            self.remaining_distance_meters = distance;
        }
        if let Some(horizon) = transition.eta_horizon {
            self.eta = now + horizon;
        }
    }

    /// Trip being simulated
    pub fn trip(&self) -> &Trip {
        &self.trip
    }

    /// Current vehicle telemetry
    pub fn telemetry(&self) -> &VehicleTelemetry {
        &self.telemetry
    }

    /// Current status
    pub fn status(&self) -> TripStatus {
        self.status
    }

    /// Whether advancing has stopped for good
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Index of the current target waypoint; equals the waypoint count when there is none
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current target waypoint
    pub fn current_target(&self) -> Option<&Waypoint> {
        self.trip.waypoint(self.cursor)
    }

    /// Estimated arrival at the next waypoint
    pub fn eta(&self) -> DateTime<Utc> {
        self.eta
    }

    /// Estimated arrival as milliseconds since the Unix epoch
    pub fn eta_millis(&self) -> i64 {
        self.eta.timestamp_millis()
    }

    /// Time left until the ETA as seen from `now`
    pub fn eta_remaining(&self, now: DateTime<Utc>) -> Duration {
        self.eta - now
    }

    /// Remaining distance in meters
    pub fn remaining_distance_meters(&self) -> f64 {
        self.remaining_distance_meters
    }

    /// Constants this session runs with
    pub fn tuning(&self) -> &SimulationTuning {
        &self.tuning
    }

    /// Copy of the observable state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            trip: self.trip.clone(),
            telemetry: self.telemetry,
            status: self.status,
            cursor: self.cursor,
            remaining_distance_meters: self.remaining_distance_meters,
            eta: self.eta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::{Coordinate, Waypoint};
    use crate::types::WaypointType;
    use chrono::TimeZone;

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn two_stop_trip(status: TripStatus) -> Trip {
        Trip::new(
            "trip-1",
            status,
            vec![
                Waypoint::with_default_title(Coordinate::new(37.422, -122.084), WaypointType::Pickup, "trip-1"),
                Waypoint::with_default_title(Coordinate::new(37.420, -122.090), WaypointType::Dropoff, "trip-1"),
            ],
            "default",
            "trip-1",
        )
        .unwrap()
    }

    #[test]
    fn test_create_seeds_initial_state() {
        let now = start_time();
        let session = SimulationSession::create_at(two_stop_trip(TripStatus::New), SimulationTuning::default(), now);

        assert_eq!(session.status(), TripStatus::New);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.remaining_distance_meters(), 2_500.0);
        assert_eq!(session.eta(), now + Duration::minutes(15));
        assert_eq!(session.telemetry().location, Coordinate::new(37.422, -122.084));
        assert_eq!(session.telemetry().heading, 0.0);
        assert_eq!(session.telemetry().timestamp, now);
        assert_eq!(session.current_target().map(|w| w.waypoint_type), Some(WaypointType::Pickup));
    }

    #[test]
    fn test_first_tick_at_pickup_arrives() {
        let now = start_time();
        let mut session =
            SimulationSession::create_at(two_stop_trip(TripStatus::EnrouteToPickup), SimulationTuning::default(), now);

        let outcome = session.advance_at(now + Duration::seconds(2));
        assert!(outcome.advanced);
        assert!(outcome.arrived);
        assert!(outcome.status_changed());
        assert_eq!(session.status(), TripStatus::ArrivedAtPickup);
        assert_eq!(session.trip().status(), TripStatus::ArrivedAtPickup);
        assert_eq!(session.remaining_distance_meters(), 2_450.0);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_eta_decays_by_five_percent() {
        let now = start_time();
        let mut session = SimulationSession::create_at(two_stop_trip(TripStatus::New), SimulationTuning::default(), now);

        session.advance_at(now);
        assert_eq!(session.eta_remaining(now), Duration::milliseconds(855_000));
    }

    #[test]
    fn test_eta_is_floored_at_one_minute() {
        let now = start_time();
        let mut session = SimulationSession::create_at(two_stop_trip(TripStatus::New), SimulationTuning::default(), now);

        // Jump past the ETA entirely
        let later = now + Duration::hours(1);
        session.advance_at(later);
        assert_eq!(session.eta_remaining(later), Duration::seconds(60));
    }

    #[test]
    fn test_terminal_session_is_untouched() {
        let now = start_time();
        for status in [TripStatus::Completed, TripStatus::Canceled] {
            let mut session = SimulationSession::create_at(two_stop_trip(status), SimulationTuning::default(), now);
            let before = session.snapshot();

            for tick in 1..20 {
                let outcome = session.advance_at(now + Duration::seconds(2 * tick));
                assert!(!outcome.advanced);
            }
            assert_eq!(session.snapshot(), before);
        }
    }

    #[test]
    fn test_no_target_keeps_position() {
        let now = start_time();
        let trip = Trip::new(
            "solo",
            TripStatus::ArrivedAtPickup,
            vec![Waypoint::with_default_title(Coordinate::new(1.0, 1.0), WaypointType::Pickup, "solo")],
            "default",
            "solo",
        )
        .unwrap();
        let tuning = SimulationTuning { initial_distance_meters: 100.0, ..Default::default() };
        let mut session = SimulationSession::create_at(trip, tuning, now);

        // 100 - 50 = 50 < 100 so the vehicle departs the only waypoint
        session.advance_at(now);
        assert_eq!(session.status(), TripStatus::EnrouteToDropoff);
        assert_eq!(session.cursor(), 1);
        assert!(session.current_target().is_none());

        let later = now + Duration::seconds(2);
        let outcome = session.advance_at(later);
        assert!(outcome.advanced);
        assert!(!outcome.arrived);
        assert_eq!(session.telemetry().location, Coordinate::new(1.0, 1.0));
        assert_eq!(session.telemetry().timestamp, later);
        assert_eq!(session.cursor(), 1);
    }

    #[test]
    fn test_snapshot_matches_accessors() {
        let now = start_time();
        let mut session = SimulationSession::create_at(two_stop_trip(TripStatus::New), SimulationTuning::default(), now);
        session.advance_at(now);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, session.status());
        assert_eq!(snapshot.cursor, session.cursor());
        assert_eq!(snapshot.eta, session.eta());
        assert_eq!(snapshot.remaining_distance_meters, session.remaining_distance_meters());
        assert_eq!(&snapshot.trip, session.trip());
        assert_eq!(&snapshot.telemetry, session.telemetry());
    }
}
