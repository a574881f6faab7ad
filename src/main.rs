// Journey Sharing Simulator - Main Entry Point
//
// Streams the trip feed for a start payload as JSON lines on stdout:
//
// ```console
// $ ./target/release/journey-sharing-simulator --trip trip.json
// ```
//
// Or with a faster tick and a tick limit:
//
// ```console
// $ ./target/release/journey-sharing-simulator --trip trip.json --tick-interval-ms 200 --max-ticks 100 --verbose
// ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossbeam_channel::{RecvTimeoutError, Sender};
use journey_sharing_simulator::simulation::{LoggingConfig, LoggingGuard, SimulationOrchestrator};
use journey_sharing_simulator::trip::{Trip, TripPayload};
use journey_sharing_simulator::types::config::CliArgs;
use journey_sharing_simulator::types::{SimulationConfig, TripStatus};
use journey_sharing_simulator::FeedEvent;
use std::io::{self, Write};
use std::{fs, process};
use tracing::{debug, error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        match SimulationConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    let _logging = match init_logging(&args) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(args) {
        error!("Simulation failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(args: &CliArgs) -> Result<LoggingGuard> {
    let mut logging = if args.debug {
        LoggingConfig::new().with_level(tracing::Level::DEBUG).with_span_events()
    } else if args.verbose {
        LoggingConfig::new().with_level(tracing::Level::INFO).with_span_events()
    } else {
        // Default: minimal logging so stdout carries only the feed
        LoggingConfig::new().with_level(tracing::Level::WARN)
    };
    if let Some(directory) = &args.log_dir {
        logging = logging.with_file_logging(directory.clone());
    }

    logging.init().map_err(|e| anyhow::anyhow!(e))
}

fn run(args: CliArgs) -> Result<()> {
    let trip_path = args.trip.clone();
    let dry_run = args.dry_run;

    let config = SimulationConfig::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    info!("Configuration loaded and validated successfully");

    let Some(trip_path) = trip_path else {
        bail!("--trip <FILE> is required unless --print-config is given");
    };
    let payload = load_payload(&trip_path)?;

    if dry_run {
        let trip = payload.into_trip().with_context(|| format!("Invalid trip in {}", trip_path))?;
        eprintln!("Configuration and trip validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_trip_summary(&config, &trip);
        return Ok(());
    }

    run_feed(config, payload)
}

fn load_payload(path: &str) -> Result<TripPayload> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read trip file {}", path))?;
    TripPayload::from_json(&text).with_context(|| format!("Failed to parse trip file {}", path))
}

/// Stream the feed until the trip ends or the tick limit is hit
fn run_feed(config: SimulationConfig, payload: TripPayload) -> Result<()> {
    let poll_interval = config.tick_interval();
    let orchestrator = SimulationOrchestrator::new(config)?;
    if let Some(provider_id) = orchestrator.config().provider_id.clone() {
        orchestrator.init(&provider_id, None);
    }

    let (done_tx, done_rx) = crossbeam_channel::unbounded();
    let subscription = orchestrator.subscribe(move |event| {
        match serde_json::to_string(event) {
            Ok(line) => {
                let mut stdout = io::stdout().lock();
                if let Err(e) = writeln!(stdout, "{}", line) {
                    error!("Failed to write {} to stdout: {}", event.name(), e);
                }
            }
            Err(e) => error!("Failed to serialize {}: {}", event.name(), e),
        }

        forward_terminal_status(event, &done_tx);
    });

    orchestrator.start(payload)?;

    loop {
        match done_rx.recv_timeout(poll_interval) {
            Ok(status) => {
                info!("Trip reached terminal status {}", status);
                break;
            }
            Err(RecvTimeoutError::Timeout) if orchestrator.is_running() => continue,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                info!("Scheduler finished before the trip ended");
                break;
            }
        }
    }

    let statistics = orchestrator.stop()?;
    subscription.unsubscribe();

    eprintln!("{}", statistics.generate_summary_report());
    Ok(())
}

/// Hand a terminal status to the feed loop; returns whether the loop received it
fn forward_terminal_status(event: &FeedEvent, done_tx: &Sender<TripStatus>) -> bool {
    let FeedEvent::TripStatusUpdated { status, .. } = event else {
        return false;
    };
    if !status.is_terminal() {
        return false;
    }
    if done_tx.send(*status).is_err() {
        debug!("Feed loop already finished; dropping terminal status {}", status);
        return false;
    }
    true
}

/// Print the validated trip and configuration
fn print_trip_summary(config: &SimulationConfig, trip: &Trip) {
    eprintln!("Trip Summary:");
    eprintln!("  Trip: {} (booking {})", trip.name(), trip.booking_id());
    eprintln!("  Status: {} ({})", trip.status(), trip.status().code());
    eprintln!("  Vehicle Type: {}", trip.vehicle_type_id());
    eprintln!("  Waypoints: {}", trip.waypoints().len());
    for (index, waypoint) in trip.waypoints().iter().enumerate() {
        eprintln!(
            "    [{}] {} '{}' at {}",
            index, waypoint.waypoint_type, waypoint.title, waypoint.location
        );
    }

    eprintln!("Configuration:");
    eprintln!("  Tick Interval: {} ms", config.tick_interval_ms);
    match config.max_ticks {
        Some(max) => eprintln!("  Max Ticks: {}", max),
        None => eprintln!("  Max Ticks: unlimited"),
    }
    eprintln!("  Step Fraction: {}", config.tuning.step_fraction);
    eprintln!("  Arrival Threshold: {} degrees", config.tuning.arrival_threshold_degrees);
    eprintln!(
        "  Initial Leg: {} m, ETA {} min",
        config.tuning.initial_distance_meters, config.tuning.initial_eta_minutes
    );
}
