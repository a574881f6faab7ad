//! Main simulation orchestrator
//!
//! This module contains the SimulationOrchestrator, the control surface a host
//! bridge talks to: provider credentials, start/stop/cleanup of the single
//! session and feed subscriptions.

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::events::{EventBus, FeedEvent, Subscription};
use crate::simulation::{
    FeedStatistics, Scheduler, SchedulerHandle, SessionSnapshot, SharedSession, SharedStatistics,
    SimulationError, SimulationResult, SimulationSession,
};
use crate::trip::TripPayload;
use crate::types::SimulationConfig;

/// Provider credentials stored by `init`; carried, never interpreted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    /// Provider project identifier
    pub provider_id: Option<String>,
    /// Provider auth token
    pub token: Option<String>,
}

#[derive(Debug)]
struct ActiveSession {
    session: SharedSession,
    statistics: SharedStatistics,
    scheduler: SchedulerHandle,
}

impl ActiveSession {
    fn trip_name(&self) -> String {
        self.session.lock().trip().name().to_string()
    }
}

/// Main simulation orchestrator; owns at most one running session
#[derive(Debug)]
pub struct SimulationOrchestrator {
    config: SimulationConfig,
    credentials: Mutex<ProviderCredentials>,
    bus: EventBus,
    active: Mutex<Option<ActiveSession>>,
}

impl Default for SimulationOrchestrator {
    fn default() -> Self {
        Self {
            config: SimulationConfig::default(),
            credentials: Mutex::new(ProviderCredentials::default()),
            bus: EventBus::new(),
            active: Mutex::new(None),
        }
    }
}

impl SimulationOrchestrator {
    /// Create an orchestrator after validating `config`
    #[instrument(skip(config), fields(tick_interval_ms = config.tick_interval_ms))]
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;
        info!("Initializing simulation orchestrator");

        let credentials = ProviderCredentials { provider_id: config.provider_id.clone(), token: None };
        Ok(Self {
            config,
            credentials: Mutex::new(credentials),
            bus: EventBus::new(),
            active: Mutex::new(None),
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Store provider credentials
    #[instrument(skip(self, token))]
    pub fn init(&self, provider_id: &str, token: Option<String>) {
        let mut credentials = self.credentials.lock();
        credentials.provider_id = Some(provider_id.to_string());
        if token.is_some() {
            credentials.token = token;
        }
        info!("Provider credentials stored");
    }

    /// Replace the provider token
    pub fn set_provider_token(&self, token: impl Into<String>) {
        self.credentials.lock().token = Some(token.into());
        debug!("Provider token updated");
    }

    /// Stored provider credentials
    pub fn credentials(&self) -> ProviderCredentials {
        self.credentials.lock().clone()
    }

    /// Register a feed listener
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&FeedEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(listener)
    }

    /// Event bus the feed is published on
    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Validate `payload`, create a session and start ticking it
    #[instrument(skip(self, payload), fields(trip = ?payload.trip_name))]
    pub fn start(&self, payload: TripPayload) -> SimulationResult<()> {
        let mut active = self.active.lock();
        if let Some(running) = active.as_ref() {
            let trip_name = running.trip_name();
            warn!("Rejecting start: trip '{}' is already running", trip_name);
            return Err(SimulationError::session_active(trip_name));
        }

        let trip = payload.into_trip()?;
        info!(
            "Starting simulation for trip '{}' with {} waypoints in status {}",
            trip.name(),
            trip.waypoints().len(),
            trip.status()
        );

        let session: SharedSession =
            Arc::new(Mutex::new(SimulationSession::with_tuning(trip, self.config.tuning)));
        let statistics: SharedStatistics = Arc::new(Mutex::new(FeedStatistics::new(Utc::now())));
        let scheduler = Scheduler::from_config(&self.config).start(
            Arc::clone(&session),
            self.bus.clone(),
            Arc::clone(&statistics),
        )?;

        *active = Some(ActiveSession { session, statistics, scheduler });
        Ok(())
    }

    /// Parse a JSON start payload and start it
    pub fn start_json(&self, json: &str) -> SimulationResult<()> {
        self.start(TripPayload::from_json(json)?)
    }

    /// Stop the running session and return its final statistics.
    ///
    /// A tick in flight publishes its whole batch before the worker exits, and
    /// from another thread no event is delivered once this returns. Called from
    /// a feed listener, the worker is not joined: the current tick still
    /// finishes after this returns and the returned statistics may not count it.
    #[instrument(skip(self))]
    pub fn stop(&self) -> SimulationResult<FeedStatistics> {
        let taken = self.active.lock().take();
        let Some(mut running) = taken else {
            warn!("Stop requested with no active session");
            return Err(SimulationError::NoSession);
        };

        // Joined outside the slot lock so listeners may still query the orchestrator
        running.scheduler.stop();
        let statistics = running.statistics.lock().clone();
        info!("Stopped simulation for trip '{}': {}", running.trip_name(), statistics.summary());
        Ok(statistics)
    }

    /// Stop any running session; succeeds when there is none
    #[instrument(skip(self))]
    pub fn cleanup(&self) {
        match self.stop() {
            Ok(_) => info!("Cleanup stopped the active session"),
            Err(_) => debug!("Cleanup found no active session"),
        }
    }

    /// Whether a session occupies the slot
    pub fn is_active(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Whether the active session's worker is still ticking
    pub fn is_running(&self) -> bool {
        self.active.lock().as_ref().map_or(false, |running| !running.scheduler.is_finished())
    }

    /// Copy of the active session state
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.active.lock().as_ref().map(|running| running.session.lock().snapshot())
    }

    /// Statistics of the active session
    pub fn statistics(&self) -> Option<FeedStatistics> {
        self.active.lock().as_ref().map(|running| running.statistics.lock().clone())
    }
}

impl Drop for SimulationOrchestrator {
    fn drop(&mut self) {
        if self.active.get_mut().is_some() {
            self.cleanup();
        }
    }
}
