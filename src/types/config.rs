//! Configuration structures for the journey sharing simulator
//!
//! This module contains the simulation configuration structure and validation logic
//! used to control the tick cadence and the heuristic constants of the trip engine.

use chrono::Duration;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default heuristic constants of the trip engine
pub mod defaults {
    /// Time between two scheduler ticks
    pub const TICK_INTERVAL_MS: u64 = 2_000;

    /// Share of the remaining gap to the target closed on every tick
    pub const STEP_FRACTION: f64 = 0.05;

    /// Coordinate-space distance under which a waypoint counts as reached (~20 m)
    pub const ARRIVAL_THRESHOLD_DEGREES: f64 = 0.0002;

    /// Remaining distance seeded when a session is created
    pub const INITIAL_DISTANCE_METERS: f64 = 2_500.0;

    /// ETA horizon seeded when a session is created
    pub const INITIAL_ETA_MINUTES: i64 = 15;

    /// Remaining distance removed on every tick
    pub const DISTANCE_DECAY_METERS: f64 = 50.0;

    /// Factor applied to the remaining time-to-ETA on every tick
    pub const ETA_DECAY_FACTOR: f64 = 0.95;

    /// Lower bound for the remaining time-to-ETA
    pub const MIN_ETA_SECONDS: i64 = 60;

    /// Vehicle leaves the pickup once remaining distance drops under this value
    pub const PICKUP_DEPARTURE_DISTANCE_METERS: f64 = 100.0;

    /// Distance reset when the vehicle leaves the pickup
    pub const DROPOFF_LEG_DISTANCE_METERS: f64 = 3_000.0;

    /// ETA horizon reset when the vehicle leaves the pickup
    pub const DROPOFF_LEG_ETA_MINUTES: i64 = 20;

    /// Distance reset when the vehicle passes an intermediate stop
    pub const INTERMEDIATE_LEG_DISTANCE_METERS: f64 = 2_000.0;

    /// ETA horizon reset when the vehicle passes an intermediate stop
    pub const INTERMEDIATE_LEG_ETA_MINUTES: i64 = 10;

    /// Longest accepted ETA horizon or ETA floor, in seconds (one day)
    pub const MAX_ETA_SECONDS: i64 = 24 * 60 * 60;
}

/// Heuristic constants driving the motion model, status machine and session decay
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimulationTuning {
    /// Share of the remaining gap to the target closed on every tick (0.0-1.0]
    pub step_fraction: f64,
    /// Coordinate-space arrival threshold in degrees
    pub arrival_threshold_degrees: f64,
    /// Remaining distance seeded at session creation
    pub initial_distance_meters: f64,
    /// ETA horizon seeded at session creation
    pub initial_eta_minutes: i64,
    /// Remaining distance removed per tick
    pub distance_decay_meters: f64,
    /// Factor applied to the remaining time-to-ETA per tick (0.0-1.0]
    pub eta_decay_factor: f64,
    /// Lower bound for the remaining time-to-ETA
    pub min_eta_seconds: i64,
    /// Remaining distance under which the vehicle departs the pickup
    pub pickup_departure_distance_meters: f64,
    /// Distance reset for the leg after the pickup
    pub dropoff_leg_distance_meters: f64,
    /// ETA horizon reset for the leg after the pickup
    pub dropoff_leg_eta_minutes: i64,
    /// Distance reset for the leg after an intermediate stop
    pub intermediate_leg_distance_meters: f64,
    /// ETA horizon reset for the leg after an intermediate stop
    pub intermediate_leg_eta_minutes: i64,
}

impl Default for SimulationTuning {
    fn default() -> Self {
        Self {
            step_fraction: defaults::STEP_FRACTION,
            arrival_threshold_degrees: defaults::ARRIVAL_THRESHOLD_DEGREES,
            initial_distance_meters: defaults::INITIAL_DISTANCE_METERS,
            initial_eta_minutes: defaults::INITIAL_ETA_MINUTES,
            distance_decay_meters: defaults::DISTANCE_DECAY_METERS,
            eta_decay_factor: defaults::ETA_DECAY_FACTOR,
            min_eta_seconds: defaults::MIN_ETA_SECONDS,
            pickup_departure_distance_meters: defaults::PICKUP_DEPARTURE_DISTANCE_METERS,
            dropoff_leg_distance_meters: defaults::DROPOFF_LEG_DISTANCE_METERS,
            dropoff_leg_eta_minutes: defaults::DROPOFF_LEG_ETA_MINUTES,
            intermediate_leg_distance_meters: defaults::INTERMEDIATE_LEG_DISTANCE_METERS,
            intermediate_leg_eta_minutes: defaults::INTERMEDIATE_LEG_ETA_MINUTES,
        }
    }
}

impl SimulationTuning {
    /// ETA horizon seeded at session creation
    pub fn initial_eta(&self) -> Duration {
        bounded_seconds(self.initial_eta_minutes.saturating_mul(60))
    }

    /// Lower bound for the remaining time-to-ETA
    pub fn min_eta(&self) -> Duration {
        bounded_seconds(self.min_eta_seconds)
    }

    /// ETA horizon for the leg after the pickup
    pub fn dropoff_leg_eta(&self) -> Duration {
        bounded_seconds(self.dropoff_leg_eta_minutes.saturating_mul(60))
    }

    /// ETA horizon for the leg after an intermediate stop
    pub fn intermediate_leg_eta(&self) -> Duration {
        bounded_seconds(self.intermediate_leg_eta_minutes.saturating_mul(60))
    }
}

// Unvalidated tuning is clamped into [0, MAX_ETA_SECONDS] so duration math cannot overflow
fn bounded_seconds(seconds: i64) -> Duration {
    Duration::seconds(seconds.clamp(0, defaults::MAX_ETA_SECONDS))
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "journey-sharing-simulator",
    version = "0.1.0",
    about = "Journey Sharing Simulator - Emulates a live trip feed without a fleet backend",
    long_about = "Advances a simulated vehicle along the waypoints of a trip and prints the resulting status, vehicle location, ETA and remaining distance updates as JSON lines.

EXAMPLES:
    # Simulate a trip until it completes
    journey-sharing-simulator --trip trip.json

    # Tick faster and stop after 100 ticks
    journey-sharing-simulator --trip trip.json --tick-interval-ms 100 --max-ticks 100

    # Use a configuration file
    journey-sharing-simulator --trip trip.json --config config.json

    # Generate configuration template
    journey-sharing-simulator --print-config > my-config.json

    # Validate trip and configuration without running
    journey-sharing-simulator --trip trip.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Trip payload file path (JSON format)
    #[arg(
        short,
        long,
        help = "Trip payload file path (JSON format)",
        long_help = "Path to a JSON file holding the start payload: tripName, tripStatus, remainingWaypoints, vehicleTypeId and bookingId."
    )]
    pub trip: Option<String>,

    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Time between ticks in milliseconds
    #[arg(
        long,
        help = "Time between ticks in milliseconds",
        long_help = "Period of the scheduler. Must be greater than 0. Default: 2000"
    )]
    pub tick_interval_ms: Option<u64>,

    /// Stop after this many ticks even if the trip is not finished
    #[arg(long, help = "Maximum number of ticks to run")]
    pub max_ticks: Option<u64>,

    /// Provider identifier passed to init
    #[arg(long, help = "Provider identifier")]
    pub provider_id: Option<String>,

    /// Share of the remaining gap closed per tick (0.0-1.0]
    #[arg(long, help = "Share of the remaining gap closed per tick (0.0-1.0]")]
    pub step_fraction: Option<f64>,

    /// Arrival threshold in coordinate degrees
    #[arg(long, help = "Arrival threshold in coordinate degrees")]
    pub arrival_threshold_degrees: Option<f64>,

    /// Directory for rolling log files
    #[arg(long, help = "Write JSON logs to this directory")]
    pub log_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate trip and configuration without running
    #[arg(long, help = "Validate trip and configuration without running the simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Time between ticks in milliseconds
    pub tick_interval_ms: Option<u64>,
    /// Maximum number of ticks for the CLI host
    pub max_ticks: Option<u64>,
    /// Provider identifier passed to init
    pub provider_id: Option<String>,
    /// Share of the remaining gap closed per tick
    pub step_fraction: Option<f64>,
    /// Arrival threshold in coordinate degrees
    pub arrival_threshold_degrees: Option<f64>,
    /// Remaining distance seeded at session creation
    pub initial_distance_meters: Option<f64>,
    /// ETA horizon seeded at session creation
    pub initial_eta_minutes: Option<i64>,
    /// Remaining distance removed per tick
    pub distance_decay_meters: Option<f64>,
    /// Factor applied to the remaining time-to-ETA per tick
    pub eta_decay_factor: Option<f64>,
    /// Lower bound for the remaining time-to-ETA
    pub min_eta_seconds: Option<i64>,
    /// Remaining distance under which the vehicle departs the pickup
    pub pickup_departure_distance_meters: Option<f64>,
    /// Distance reset for the leg after the pickup
    pub dropoff_leg_distance_meters: Option<f64>,
    /// ETA horizon reset for the leg after the pickup
    pub dropoff_leg_eta_minutes: Option<i64>,
    /// Distance reset for the leg after an intermediate stop
    pub intermediate_leg_distance_meters: Option<f64>,
    /// ETA horizon reset for the leg after an intermediate stop
    pub intermediate_leg_eta_minutes: Option<i64>,
}

/// Configuration for the journey sharing simulation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Time between ticks in milliseconds
    pub tick_interval_ms: u64,

    /// Maximum number of ticks for the CLI host (None runs until the trip ends)
    pub max_ticks: Option<u64>,

    /// Provider identifier passed to init
    pub provider_id: Option<String>,

    /// Engine constants
    #[serde(flatten)]
    pub tuning: SimulationTuning,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for simulation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Tick interval is invalid
    #[error("Tick interval must be greater than 0 ms, got {0}")]
    InvalidTickInterval(u64),

    /// Max ticks is invalid
    #[error("Max ticks must be greater than 0 when set, got {0}")]
    InvalidMaxTicks(u64),

    /// Fraction value is out of range
    #[error("Invalid fraction for {field}: {value} (must be greater than 0.0 and at most 1.0)")]
    InvalidFraction {
        /// Name of the field with the invalid fraction
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Distance or threshold is negative or not finite
    #[error("Invalid value for {field}: {value} (must be a finite non-negative number)")]
    InvalidDistance {
        /// Name of the field with the invalid value
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Arrival threshold must be strictly positive
    #[error("Arrival threshold must be greater than 0, got {0}")]
    InvalidArrivalThreshold(f64),

    /// Time horizon is negative or longer than one day
    #[error("Invalid duration for {field}: {value} (must be between 0 and one day)")]
    InvalidDuration {
        /// Name of the field with the invalid duration
        field: String,
        /// The invalid value
        value: i64,
    },
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: defaults::TICK_INTERVAL_MS,
            max_ticks: None,
            provider_id: None,
            tuning: SimulationTuning::default(),
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration from command line arguments and optional config file
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::from_cli_args(args)
    }

    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = fs::read_to_string(path)?;
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();
        let tuning = defaults.tuning;

        Self {
            tick_interval_ms: config_file.tick_interval_ms.unwrap_or(defaults.tick_interval_ms),
            max_ticks: config_file.max_ticks.or(defaults.max_ticks),
            provider_id: config_file.provider_id.or(defaults.provider_id),
            tuning: SimulationTuning {
                step_fraction: config_file.step_fraction.unwrap_or(tuning.step_fraction),
                arrival_threshold_degrees: config_file
                    .arrival_threshold_degrees
                    .unwrap_or(tuning.arrival_threshold_degrees),
                initial_distance_meters: config_file
                    .initial_distance_meters
                    .unwrap_or(tuning.initial_distance_meters),
                initial_eta_minutes: config_file
                    .initial_eta_minutes
                    .unwrap_or(tuning.initial_eta_minutes),
                distance_decay_meters: config_file
                    .distance_decay_meters
                    .unwrap_or(tuning.distance_decay_meters),
                eta_decay_factor: config_file.eta_decay_factor.unwrap_or(tuning.eta_decay_factor),
                min_eta_seconds: config_file.min_eta_seconds.unwrap_or(tuning.min_eta_seconds),
                pickup_departure_distance_meters: config_file
                    .pickup_departure_distance_meters
                    .unwrap_or(tuning.pickup_departure_distance_meters),
                dropoff_leg_distance_meters: config_file
                    .dropoff_leg_distance_meters
                    .unwrap_or(tuning.dropoff_leg_distance_meters),
                dropoff_leg_eta_minutes: config_file
                    .dropoff_leg_eta_minutes
                    .unwrap_or(tuning.dropoff_leg_eta_minutes),
                intermediate_leg_distance_meters: config_file
                    .intermediate_leg_distance_meters
                    .unwrap_or(tuning.intermediate_leg_distance_meters),
                intermediate_leg_eta_minutes: config_file
                    .intermediate_leg_eta_minutes
                    .unwrap_or(tuning.intermediate_leg_eta_minutes),
            },
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.tick_interval_ms {
            config.tick_interval_ms = value;
        }
        if let Some(value) = args.max_ticks {
            config.max_ticks = Some(value);
        }
        if let Some(value) = args.provider_id {
            config.provider_id = Some(value);
        }
        if let Some(value) = args.step_fraction {
            config.tuning.step_fraction = value;
        }
        if let Some(value) = args.arrival_threshold_degrees {
            config.tuning.arrival_threshold_degrees = value;
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Scheduler period as a std duration
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigValidationError::InvalidTickInterval(self.tick_interval_ms));
        }

        if let Some(0) = self.max_ticks {
            return Err(ConfigValidationError::InvalidMaxTicks(0));
        }

        let tuning = &self.tuning;

        self.validate_fraction("step_fraction", tuning.step_fraction)?;
        self.validate_fraction("eta_decay_factor", tuning.eta_decay_factor)?;

        if !(tuning.arrival_threshold_degrees.is_finite() && tuning.arrival_threshold_degrees > 0.0)
        {
            return Err(ConfigValidationError::InvalidArrivalThreshold(
                tuning.arrival_threshold_degrees,
            ));
        }

        self.validate_distance("initial_distance_meters", tuning.initial_distance_meters)?;
        self.validate_distance("distance_decay_meters", tuning.distance_decay_meters)?;
        self.validate_distance(
            "pickup_departure_distance_meters",
            tuning.pickup_departure_distance_meters,
        )?;
        self.validate_distance("dropoff_leg_distance_meters", tuning.dropoff_leg_distance_meters)?;
        self.validate_distance(
            "intermediate_leg_distance_meters",
            tuning.intermediate_leg_distance_meters,
        )?;

        self.validate_duration("initial_eta_minutes", tuning.initial_eta_minutes, 60)?;
        self.validate_duration("min_eta_seconds", tuning.min_eta_seconds, 1)?;
        self.validate_duration("dropoff_leg_eta_minutes", tuning.dropoff_leg_eta_minutes, 60)?;
        self.validate_duration("intermediate_leg_eta_minutes", tuning.intermediate_leg_eta_minutes, 60)?;

        Ok(())
    }

    fn validate_fraction(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(ConfigValidationError::InvalidFraction { field: field.to_string(), value });
        }
        Ok(())
    }

    fn validate_distance(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        if !(value.is_finite() && value >= 0.0) {
            return Err(ConfigValidationError::InvalidDistance { field: field.to_string(), value });
        }
        Ok(())
    }

    fn validate_duration(&self, field: &str, value: i64, unit_seconds: i64) -> Result<(), ConfigValidationError> {
        if value < 0 || value > defaults::MAX_ETA_SECONDS / unit_seconds {
            return Err(ConfigValidationError::InvalidDuration { field: field.to_string(), value });
        }
        Ok(())
    }
}
