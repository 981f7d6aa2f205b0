// Sensorfleet - Synthetic IoT telemetry generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Sensorfleet
//!
//! Synthetic IoT telemetry generator: simulates a fleet of environmental
//! sensor devices emitting periodic readings, for feeding ingestion
//! pipelines with realistic-looking test data without real hardware.
//!
//! Each simulated device evolves its sensor values tick over tick with a
//! bounded random walk, decays its battery, occasionally injects anomalies,
//! occasionally skips a report, and redraws its operational status - all
//! driven by a single injected random source so that seeded runs are fully
//! reproducible.
//!
//! ## Quick Start
//!
//! ```rust
//! use sensorfleet::{
//!     create_fleet, CancelFlag, LocationRegistry, MemorySink, ReadingGenerator,
//!     SimulationConfig, StreamDriver,
//! };
//!
//! // Ten devices, five ticks, deterministic.
//! let config = SimulationConfig::new()
//!     .with_frequency_seconds(0.01)
//!     .with_reading_count(5)
//!     .with_seed(42);
//! config.validate().unwrap();
//!
//! let registry = LocationRegistry::builtin();
//! let mut generator = ReadingGenerator::from_config(&config);
//! let mut fleet = create_fleet(&config, &registry, generator.rng_mut()).unwrap();
//!
//! let mut sink = MemorySink::new();
//! let driver = StreamDriver::from_config(&config);
//! let summary = driver.run(&mut fleet, &mut generator, &mut sink, &CancelFlag::new());
//!
//! assert_eq!(summary.ticks, 5);
//! assert_eq!(summary.emitted + summary.suppressed, 50);
//! ```
//!
//! ## Modules
//!
//! - [`location`]: Built-in site registry for device placement
//! - [`device`]: Device profiles and fleet creation
//! - [`sensor`]: Per-kind value evolution (drift, decay, anomalies)
//! - [`status`]: Operational status model
//! - [`reading`]: The emitted record and its flattened projection
//! - [`generator`]: Reading assembly and device state transitions
//! - [`driver`]: Tick loop over the fleet
//! - [`sink`]: Output destinations (console, file, memory)
//! - [`config`]: Simulation options and validation

pub mod config;
pub mod device;
pub mod driver;
pub mod generator;
pub mod location;
pub mod reading;
pub mod sensor;
pub mod sink;
pub mod status;

// Re-exports for convenient access
pub use config::{ConfigError, SensorSelection, SimulationConfig};
pub use device::{create_fleet, DeviceProfile};
pub use driver::{CancelFlag, RunSummary, StreamDriver};
pub use generator::ReadingGenerator;
pub use location::{Location, LocationRegistry};
pub use reading::{Coordinates, FlatReading, Reading, ReadingParseError};
pub use sensor::{SensorKind, SensorSpec};
pub use sink::{ConsoleSink, CsvFileSink, JsonFileSink, MemorySink, Sink, SinkError};
pub use status::DeviceStatus;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
