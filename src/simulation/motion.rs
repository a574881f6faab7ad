//! Vehicle motion model
//!
//! Moves the simulated vehicle a fixed share of the remaining gap toward its target
//! on every tick. All geometry is done directly on coordinate degrees: this is a
//! visual approximation, not a great-circle computation, and the arrival threshold
//! only approximates ~20 m at mid latitudes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::trip::Coordinate;
use crate::types::{defaults, SimulationTuning};

/// Last reported position of the simulated vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleTelemetry {
    /// Vehicle position
    pub location: Coordinate,
    /// Heading in degrees, within [0, 360)
    pub heading: f64,
    /// When this telemetry was produced
    pub timestamp: DateTime<Utc>,
}

impl VehicleTelemetry {
    /// Create telemetry for a vehicle at rest facing north
    pub fn at_rest(location: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self { location, heading: 0.0, timestamp }
    }

    /// Timestamp as milliseconds since the Unix epoch
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Result of moving the vehicle for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    /// Telemetry after the move
    pub telemetry: VehicleTelemetry,
    /// Whether the new position is within the arrival threshold of the target
    pub arrived: bool,
}

/// Linear-interpolation motion model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionModel {
    step_fraction: f64,
    arrival_threshold_degrees: f64,
}

impl Default for MotionModel {
    fn default() -> Self {
        Self {
            step_fraction: defaults::STEP_FRACTION,
            arrival_threshold_degrees: defaults::ARRIVAL_THRESHOLD_DEGREES,
        }
    }
}

impl MotionModel {
    /// Create a motion model with explicit constants
    pub fn new(step_fraction: f64, arrival_threshold_degrees: f64) -> Self {
        Self { step_fraction, arrival_threshold_degrees }
    }

    /// Create a motion model from the simulation tuning
    pub fn from_tuning(tuning: &SimulationTuning) -> Self {
        Self::new(tuning.step_fraction, tuning.arrival_threshold_degrees)
    }

    /// Share of the remaining gap closed per tick
    pub fn step_fraction(&self) -> f64 {
        self.step_fraction
    }

    /// Arrival threshold in degrees
    pub fn arrival_threshold_degrees(&self) -> f64 {
        self.arrival_threshold_degrees
    }

    /// Move from `current` toward `target` and test for arrival.
    ///
    /// Heading is taken from the position before the move. Arrival is tested
    /// against the position after the move.
    pub fn step(
        &self,
        current: &VehicleTelemetry,
        target: Coordinate,
        now: DateTime<Utc>,
    ) -> MotionStep {
        let heading = heading_degrees(current.location, target);
        let location = interpolate(current.location, target, self.step_fraction);
        let arrived = self.is_arrival(location, target);

        MotionStep { telemetry: VehicleTelemetry { location, heading, timestamp: now }, arrived }
    }

    /// Whether `position` is close enough to `target` to count as reached
    pub fn is_arrival(&self, position: Coordinate, target: Coordinate) -> bool {
        degree_distance(position, target) < self.arrival_threshold_degrees
    }
}

/// Point `fraction` of the way from `from` to `to`
pub fn interpolate(from: Coordinate, to: Coordinate, fraction: f64) -> Coordinate {
    Coordinate::new(from.lat + (to.lat - from.lat) * fraction, from.lng + (to.lng - from.lng) * fraction)
}

/// Bearing from `from` to `to` in degrees, normalised into [0, 360)
pub fn heading_degrees(from: Coordinate, to: Coordinate) -> f64 {
    let mut heading = (to.lng - from.lng).atan2(to.lat - from.lat).to_degrees();
    if heading < 0.0 {
        heading += 360.0;
    }
    // -1e-15 + 360.0 rounds to 360.0
    if heading >= 360.0 {
        heading = 0.0;
    }
    heading
}

/// Euclidean distance between two coordinates in degree space
pub fn degree_distance(a: Coordinate, b: Coordinate) -> f64 {
    (a.lat - b.lat).hypot(a.lng - b.lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_interpolate_closes_five_percent() {
        let from = Coordinate::new(0.0, 0.0);
        let to = Coordinate::new(1.0, -2.0);

        let next = interpolate(from, to, 0.05);
        assert!((next.lat - 0.05).abs() < 1e-12);
        assert!((next.lng + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_heading_cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);

        assert!((heading_degrees(origin, Coordinate::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((heading_degrees(origin, Coordinate::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((heading_degrees(origin, Coordinate::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((heading_degrees(origin, Coordinate::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_heading_is_in_range() {
        let origin = Coordinate::new(37.422, -122.084);
        let targets = [
            Coordinate::new(37.420, -122.090),
            Coordinate::new(37.422, -122.084),
            Coordinate::new(37.422 - 1e-13, -122.084 - 1e-17),
            Coordinate::new(-10.0, 170.0),
            Coordinate::new(80.0, -179.0),
        ];

        for target in targets {
            let heading = heading_degrees(origin, target);
            assert!((0.0..360.0).contains(&heading), "heading {} out of range", heading);
        }
    }

    #[test]
    fn test_degree_distance() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);
        assert!((degree_distance(a, b) - 5.0).abs() < 1e-12);
        assert_eq!(degree_distance(a, a), 0.0);
    }

    #[test]
    fn test_step_uses_pre_move_heading_and_post_move_arrival() {
        let model = MotionModel::default();
        let current = VehicleTelemetry::at_rest(Coordinate::new(0.0, 0.0), now());
        let target = Coordinate::new(0.0, 0.001);

        let step = model.step(&current, target, now());
        assert!((step.telemetry.heading - 90.0).abs() < 1e-9);
        assert!((step.telemetry.location.lng - 0.00005).abs() < 1e-12);
        assert!(!step.arrived);
    }

    #[test]
    fn test_step_on_target_is_arrival() {
        let model = MotionModel::default();
        let target = Coordinate::new(37.422, -122.084);
        let current = VehicleTelemetry::at_rest(target, now());

        let step = model.step(&current, target, now());
        assert!(step.arrived);
        assert_eq!(step.telemetry.location, target);
        assert_eq!(step.telemetry.heading, 0.0);
    }

    #[test]
    fn test_step_converges_to_arrival() {
        let model = MotionModel::default();
        let target = Coordinate::new(37.420, -122.090);
        let mut telemetry = VehicleTelemetry::at_rest(Coordinate::new(37.422, -122.084), now());

        let mut ticks = 0;
        loop {
            let step = model.step(&telemetry, target, now());
            telemetry = step.telemetry;
            ticks += 1;
            if step.arrived {
                break;
            }
            assert!(ticks < 500, "vehicle never arrived");
        }

        assert!(degree_distance(telemetry.location, target) < defaults::ARRIVAL_THRESHOLD_DEGREES);
        assert!(ticks > 1);
    }

    #[test]
    fn test_from_tuning() {
        let tuning = SimulationTuning { step_fraction: 0.5, ..Default::default() };
        let model = MotionModel::from_tuning(&tuning);
        assert_eq!(model.step_fraction(), 0.5);
        assert_eq!(model.arrival_threshold_degrees(), 0.0002);
    }
}
