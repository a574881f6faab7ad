//! Statistics collection and reporting
//!
//! This module contains the counters the scheduler keeps while a session runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::events::FeedEventKind;
use crate::simulation::TickOutcome;
use crate::types::TripStatus;

/// Counters for one running feed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedStatistics {
    /// Ticks the scheduler started
    pub ticks_attempted: u64,
    /// Ticks that changed session state
    pub ticks_advanced: u64,
    /// Ticks dropped because the engine failed
    pub ticks_skipped: u64,
    /// Listener calls that panicked
    pub listener_failures: u64,
    /// Ticks on which the vehicle reached its target
    pub arrivals: u64,
    /// Ticks that moved the trip to another status
    pub status_transitions: u64,
    /// Status events published
    pub status_events: u64,
    /// Vehicle location events published
    pub location_events: u64,
    /// ETA events published
    pub eta_events: u64,
    /// Remaining distance events published
    pub distance_events: u64,
    /// Status after the most recent tick
    pub last_status: Option<TripStatus>,
    /// When the scheduler started
    pub started_at: Option<DateTime<Utc>>,
    /// When the most recent tick ran
    pub last_tick_at: Option<DateTime<Utc>>,
}

impl FeedStatistics {
    /// Create statistics for a feed started at `started_at`
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self { started_at: Some(started_at), ..Default::default() }
    }

    /// Record the start of a tick
    pub fn record_tick_started(&mut self, at: DateTime<Utc>) {
        self.ticks_attempted += 1;
        self.last_tick_at = Some(at);
    }

    /// Record what a completed tick did
    pub fn record_outcome(&mut self, outcome: &TickOutcome) {
        if outcome.advanced {
            self.ticks_advanced += 1;
        }
        if outcome.arrived {
            self.arrivals += 1;
        }
        if outcome.status_changed() {
            self.status_transitions += 1;
        }
        self.last_status = Some(outcome.status_after);
    }

    /// Record a tick dropped after a failure
    pub fn record_skipped_tick(&mut self) {
        self.ticks_skipped += 1;
    }

    /// Record listener calls that panicked while an event was delivered
    pub fn record_listener_failures(&mut self, failures: u64) {
        self.listener_failures += failures;
    }

    /// Record one published event
    pub fn record_event(&mut self, kind: FeedEventKind) {
        match kind {
            FeedEventKind::TripStatusUpdated => self.status_events += 1,
            FeedEventKind::VehicleLocationUpdated => self.location_events += 1,
            FeedEventKind::EtaToNextWaypointUpdated => self.eta_events += 1,
            FeedEventKind::RemainingDistanceUpdated => self.distance_events += 1,
        }
    }

    /// Events published for `kind`
    pub fn events_of(&self, kind: FeedEventKind) -> u64 {
        match kind {
            FeedEventKind::TripStatusUpdated => self.status_events,
            FeedEventKind::VehicleLocationUpdated => self.location_events,
            FeedEventKind::EtaToNextWaypointUpdated => self.eta_events,
            FeedEventKind::RemainingDistanceUpdated => self.distance_events,
        }
    }

    /// Total events published
    pub fn total_events(&self) -> u64 {
        self.status_events + self.location_events + self.eta_events + self.distance_events
    }

    /// Share of attempted ticks that were skipped
    pub fn skipped_percentage(&self) -> f64 {
        if self.ticks_attempted == 0 {
            0.0
        } else {
            (self.ticks_skipped as f64 / self.ticks_attempted as f64) * 100.0
        }
    }

    /// Time between start and the most recent tick
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        Some(self.last_tick_at? - self.started_at?)
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "Feed Summary: {} ticks ({} advanced, {} skipped, {:.1}%) | {} arrivals | {} status transitions | {} events published | {} listener failures",
            self.ticks_attempted,
            self.ticks_advanced,
            self.ticks_skipped,
            self.skipped_percentage(),
            self.arrivals,
            self.status_transitions,
            self.total_events(),
            self.listener_failures
        )
    }

    /// Multi-line report
    pub fn generate_summary_report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Trip Feed Summary ===\n\n");

        if let Some(elapsed) = self.elapsed() {
            report.push_str(&format!(
                "Feed Duration: {:.2} seconds\n",
                elapsed.num_milliseconds() as f64 / 1000.0
            ));
        }
        if let Some(status) = self.last_status {
            report.push_str(&format!("Final Status: {} ({})\n", status, status.code()));
        }
        report.push('\n');

        report.push_str("Ticks:\n");
        report.push_str(&format!("  - Attempted: {}\n", self.ticks_attempted));
        report.push_str(&format!("  - Advanced: {}\n", self.ticks_advanced));
        report.push_str(&format!(
            "  - Skipped: {} ({:.1}%)\n",
            self.ticks_skipped,
            self.skipped_percentage()
        ));
        report.push_str(&format!("  - Arrivals: {}\n", self.arrivals));
        report.push_str(&format!("  - Status Transitions: {}\n\n", self.status_transitions));

        report.push_str("Events Published:\n");
        for kind in FeedEventKind::ALL {
            report.push_str(&format!("  - {}: {}\n", kind, self.events_of(kind)));
        }
        report.push_str(&format!("  - Total: {}\n", self.total_events()));
        report.push_str(&format!("  - Listener Failures: {}\n", self.listener_failures));

        report
    }
}

impl fmt::Display for FeedStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
