//! Tick scheduler
//!
//! Runs a session on a dedicated worker thread: advance, snapshot, then publish
//! the four feed events, once per period. The first tick runs as soon as the
//! worker starts. Cancellation takes effect at tick boundaries; a tick that has
//! started always publishes its whole batch.

use chrono::Utc;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, field, info, instrument};

use crate::events::{EventBus, FeedEvent};
use crate::sim_event;
use crate::simulation::{FeedStatistics, SimulationError, SimulationResult, SimulationSession};
use crate::types::SimulationConfig;

/// Session shared between the worker and control callers
pub type SharedSession = Arc<Mutex<SimulationSession>>;

/// Statistics shared between the worker and control callers
pub type SharedStatistics = Arc<Mutex<FeedStatistics>>;

/// Cooperative cancellation signal for a scheduler worker
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    wake: Arc<Mutex<Option<Sender<()>>>>,
}

impl CancellationToken {
    fn new() -> (Self, Receiver<()>) {
        let (wake, sleeper) = bounded(0);
        let token = Self { cancelled: Arc::new(AtomicBool::new(false)), wake: Arc::new(Mutex::new(Some(wake))) };
        (token, sleeper)
    }

    /// Fire the token and wake the worker if it is sleeping
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Disconnecting the channel ends any pending recv_timeout
        self.wake.lock().take();
    }

    /// Whether the token has fired
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Periodic driver for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    period: Duration,
    max_ticks: Option<u64>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl Scheduler {
    /// Create a scheduler ticking every `period`
    pub fn new(period: Duration) -> Self {
        Self { period, max_ticks: None }
    }

    /// Create a scheduler from the simulation configuration
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self { period: config.tick_interval(), max_ticks: config.max_ticks }
    }

    /// Stop the worker on its own after `max_ticks` ticks
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Tick period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick limit, if any
    pub fn max_ticks(&self) -> Option<u64> {
        self.max_ticks
    }

    /// Spawn the worker thread for `session`
    #[instrument(skip_all, fields(period_ms = self.period.as_millis() as u64, max_ticks = ?self.max_ticks))]
    pub fn start(
        &self,
        session: SharedSession,
        bus: EventBus,
        statistics: SharedStatistics,
    ) -> SimulationResult<SchedulerHandle> {
        let trip_name = session.lock().trip().name().to_string();
        let (token, sleeper) = CancellationToken::new();

        let worker = Worker {
            period: self.period,
            max_ticks: self.max_ticks,
            session,
            bus,
            statistics,
            token: token.clone(),
            sleeper,
            trip_name: trip_name.clone(),
        };

        let handle = thread::Builder::new()
            .name(format!("trip-feed-{}", trip_name))
            .spawn(move || worker.run())?;

        info!("Scheduler started for trip '{}'", trip_name);
        Ok(SchedulerHandle { token, worker: Some(handle) })
    }
}

/// Owner of a running worker; dropping it stops the worker
#[derive(Debug)]
pub struct SchedulerHandle {
    token: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Cancel the worker and wait for it to exit.
    ///
    /// A tick in flight finishes publishing its four events first; once this
    /// returns no further event is published. When called from the worker
    /// itself (a listener stopping the feed) the join is skipped: the current
    /// tick still completes after this returns, and no later tick starts.
    pub fn stop(&mut self) {
        self.token.cancel();

        let Some(worker) = self.worker.take() else {
            return;
        };

        if worker.thread().id() == thread::current().id() {
            debug!("Stop requested from the scheduler thread; not joining");
            return;
        }

        if worker.join().is_err() {
            error!("Scheduler thread terminated abnormally");
        }
    }

    /// Whether the worker has exited
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancellation token of the worker
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    period: Duration,
    max_ticks: Option<u64>,
    session: SharedSession,
    bus: EventBus,
    statistics: SharedStatistics,
    token: CancellationToken,
    sleeper: Receiver<()>,
    trip_name: String,
}

impl Worker {
    fn run(self) {
        let mut ticks = 0u64;

        loop {
            if self.token.is_cancelled() {
                break;
            }
            if self.max_ticks.map_or(false, |max| ticks >= max) {
                info!("Reached tick limit of {}", ticks);
                break;
            }

            ticks += 1;
            self.run_tick(ticks);

            match self.sleeper.recv_timeout(self.period) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        debug!(ticks, "Scheduler worker for trip '{}' exiting", self.trip_name);
    }

    fn run_tick(&self, tick: u64) {
        self.statistics.lock().record_tick_started(Utc::now());

        let error = match panic::catch_unwind(AssertUnwindSafe(|| self.tick())) {
            Ok(Ok(())) => return,
            Ok(Err(error)) => error,
            Err(payload) => SimulationError::from_panic("tick", payload.as_ref()),
        };

        error!(code = error.code(), tick, trip = %self.trip_name, "Skipping tick: {}", error);
        self.statistics.lock().record_skipped_tick();
    }

    fn tick(&self) -> SimulationResult<()> {
        let (outcome, events) = {
            let mut session = self.session.lock();
            let outcome = session.advance_at(Utc::now());
            (outcome, FeedEvent::for_tick(&session.snapshot()))
        };

        if let Some(event) = events.iter().find(|event| !event.is_finite()) {
            return Err(SimulationError::internal(format!("non-finite value in {} payload", event.name())));
        }

        self.statistics.lock().record_outcome(&outcome);
        if outcome.status_changed() {
            sim_event!(
                info,
                "Trip status changed",
                trip = self.trip_name.as_str(),
                from = field::display(outcome.status_before),
                to = field::display(outcome.status_after),
            );
        }

        for event in events.iter() {
            let failures = self.bus.publish(event);
            let mut statistics = self.statistics.lock();
            statistics.record_event(event.kind());
            statistics.record_listener_failures(failures);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::{Coordinate, Trip, Waypoint};
    use crate::types::{TripStatus, WaypointType};
    use std::time::Instant;

    fn shared_session() -> SharedSession {
        let trip = Trip::new(
            "sched",
            TripStatus::EnrouteToPickup,
            vec![
                Waypoint::with_default_title(Coordinate::new(37.422, -122.084), WaypointType::Pickup, "sched"),
                Waypoint::with_default_title(Coordinate::new(37.420, -122.090), WaypointType::Dropoff, "sched"),
            ],
            "default",
            "sched",
        )
        .unwrap();
        Arc::new(Mutex::new(SimulationSession::create(trip)))
    }

    fn wait_for(deadline: Duration, condition: impl Fn() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    #[test]
    fn test_cancellation_token() {
        let (token, sleeper) = CancellationToken::new();
        assert!(!token.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(
            sleeper.recv_timeout(Duration::from_secs(5)),
            Err(RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn test_first_tick_runs_immediately() {
        let statistics: SharedStatistics = Arc::new(Mutex::new(FeedStatistics::new(Utc::now())));
        let scheduler = Scheduler::new(Duration::from_secs(3600));

        let mut handle =
            scheduler.start(shared_session(), EventBus::new(), Arc::clone(&statistics)).unwrap();
        assert!(wait_for(Duration::from_secs(5), || statistics.lock().ticks_attempted == 1));

        handle.stop();
        assert!(handle.is_finished());
        assert_eq!(statistics.lock().ticks_attempted, 1);
    }

    #[test]
    fn test_max_ticks_stops_worker() {
        let statistics: SharedStatistics = Arc::new(Mutex::new(FeedStatistics::default()));
        let scheduler = Scheduler::new(Duration::from_millis(1)).with_max_ticks(3);

        let handle = scheduler.start(shared_session(), EventBus::new(), Arc::clone(&statistics)).unwrap();
        assert!(wait_for(Duration::from_secs(5), || handle.is_finished()));

        let stats = statistics.lock();
        assert_eq!(stats.ticks_attempted, 3);
        assert_eq!(stats.total_events(), 12);
    }

    #[test]
    fn test_listener_panic_is_counted_not_skipped() {
        let statistics: SharedStatistics = Arc::new(Mutex::new(FeedStatistics::default()));
        let bus = EventBus::new();
        let _subscription = bus.subscribe(|event| {
            if event.name() == "onTripVehicleLocationUpdated" {
                panic!("listener failure");
            }
        });

        let scheduler = Scheduler::new(Duration::from_millis(1)).with_max_ticks(2);
        let handle = scheduler.start(shared_session(), bus, Arc::clone(&statistics)).unwrap();
        assert!(wait_for(Duration::from_secs(5), || handle.is_finished()));

        let stats = statistics.lock();
        assert_eq!(stats.ticks_attempted, 2);
        assert_eq!(stats.ticks_skipped, 0);
        assert_eq!(stats.location_events, 2);
        assert_eq!(stats.total_events(), 8);
        assert_eq!(stats.listener_failures, 2);
    }

    #[test]
    fn test_stop_lets_in_flight_tick_finish() {
        let bus = EventBus::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let token_slot: Arc<Mutex<Option<CancellationToken>>> = Arc::new(Mutex::new(None));
        let (entered_tx, entered_rx) = bounded::<()>(1);

        let sink = Arc::clone(&received);
        let slot = Arc::clone(&token_slot);
        let _subscription = bus.subscribe(move |event| {
            sink.lock().push(event.name());
            if event.name() == "onTripStatusUpdated" {
                let _ = entered_tx.send(());
                // Hold the tick open until the control thread has cancelled
                let cancelled = || slot.lock().as_ref().map_or(false, CancellationToken::is_cancelled);
                wait_for(Duration::from_secs(5), cancelled);
            }
        });

        let statistics: SharedStatistics = Arc::new(Mutex::new(FeedStatistics::default()));
        let mut handle = Scheduler::new(Duration::from_secs(3600))
            .start(shared_session(), bus, Arc::clone(&statistics))
            .unwrap();
        *token_slot.lock() = Some(handle.token().clone());

        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.stop();

        assert_eq!(
            *received.lock(),
            vec![
                "onTripStatusUpdated",
                "onTripVehicleLocationUpdated",
                "onTripETAToNextWaypointUpdated",
                "onTripActiveRouteRemainingDistanceUpdated",
            ]
        );
        assert_eq!(statistics.lock().ticks_attempted, 1);
        assert_eq!(statistics.lock().total_events(), 4);
    }
}
