// Sensorfleet CLI - Synthetic IoT telemetry generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Sensorfleet CLI
//!
//! Command-line front end for the sensorfleet generator.
//!
//! ## Usage
//!
//! ```bash
//! # Ten devices to stdout, one tick per second, until Ctrl-C
//! sensorfleet
//!
//! # Bounded deterministic run to a CSV file
//! sensorfleet --devices 25 --count 120 --seed 42 --output run.csv --format csv
//!
//! # Devices with random sensor subsets, fast cadence
//! sensorfleet --sensors random --frequency 0.1
//! ```

use clap::{Parser, ValueEnum};
use sensorfleet::{
    create_fleet, CancelFlag, ConsoleSink, CsvFileSink, JsonFileSink, LocationRegistry,
    ReadingGenerator, SensorSelection, SimulationConfig, Sink, StreamDriver,
};
use std::collections::BTreeSet;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Generate synthetic IoT sensor telemetry
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of devices to simulate
    #[arg(short, long, default_value = "10")]
    devices: usize,

    /// Seconds between ticks
    #[arg(short, long, default_value = "1.0")]
    frequency: f64,

    /// Number of ticks to run (omit to run until Ctrl-C)
    #[arg(short, long)]
    count: Option<u64>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<String>,

    /// Output file format
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Sensor assignment: "all", "random", or a comma-separated list of
    /// kinds (temperature, humidity, pressure, light, air_quality, battery)
    #[arg(long, default_value = "all")]
    sensors: String,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    /// Newline-delimited JSON records
    Json,
    /// Flattened CSV with a header row
    Csv,
}

fn parse_sensors(arg: &str) -> Result<SensorSelection, String> {
    match arg {
        "all" => Ok(SensorSelection::All),
        "random" => Ok(SensorSelection::random()),
        list => {
            let mut kinds = BTreeSet::new();
            for part in list.split(',') {
                let kind = part
                    .trim()
                    .parse()
                    .map_err(|err| format!("{err} (in --sensors)"))?;
                kinds.insert(kind);
            }
            Ok(SensorSelection::Fixed(kinds))
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    // Log lines go to stderr so piped stdout stays pure JSON.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    info!("sensorfleet v{}", sensorfleet::VERSION);

    let selection = match parse_sensors(&args.sensors) {
        Ok(selection) => selection,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(2);
        }
    };

    let mut config = SimulationConfig::new()
        .with_device_count(args.devices)
        .with_frequency_seconds(args.frequency)
        .with_sensor_selection(selection);
    if let Some(count) = args.count {
        config = config.with_reading_count(count);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    if let Err(err) = config.validate() {
        error!("invalid configuration: {err}");
        return ExitCode::from(2);
    }

    let registry = LocationRegistry::builtin();
    let mut generator = ReadingGenerator::from_config(&config);
    let mut fleet = match create_fleet(&config, &registry, generator.rng_mut()) {
        Ok(fleet) => fleet,
        Err(err) => {
            error!("fleet creation failed: {err}");
            return ExitCode::from(2);
        }
    };
    info!(
        devices = fleet.len(),
        sites = registry.len(),
        "fleet initialized"
    );

    let mut sink: Box<dyn Sink + Send> = match (&args.output, args.format) {
        (None, _) => Box::new(ConsoleSink::new()),
        (Some(path), OutputFormat::Json) => match JsonFileSink::create(path) {
            Ok(sink) => {
                info!(path = %path, "writing JSON records");
                Box::new(sink)
            }
            Err(err) => {
                error!("cannot open {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        (Some(path), OutputFormat::Csv) => match CsvFileSink::create(path) {
            Ok(sink) => {
                info!(path = %path, "writing CSV rows");
                Box::new(sink)
            }
            Err(err) => {
                error!("cannot open {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
    };

    let cancel = CancelFlag::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, finishing current tick");
            signal_cancel.cancel();
        }
    });

    let driver = StreamDriver::from_config(&config);
    let summary = tokio::task::spawn_blocking(move || {
        driver.run(&mut fleet, &mut generator, sink.as_mut(), &cancel)
    })
    .await
    .expect("driver task panicked");

    info!(
        ticks = summary.ticks,
        emitted = summary.emitted,
        suppressed = summary.suppressed,
        sink_failures = summary.sink_failures,
        "run complete"
    );

    if summary.sink_failures > 0 {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
