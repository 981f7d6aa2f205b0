// Sensorfleet - Simulation configuration
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Simulation options and validation.
//!
//! Every recognized option is an explicit field; `validate` runs before
//! any tick and rejects bad setups up front.

use crate::sensor::SensorKind;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Configuration errors. Raised at setup, before any tick runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Fleet size below one.
    #[error("fleet must contain at least one device, got {0}")]
    InvalidDeviceCount(usize),

    /// Non-positive or non-finite emission frequency.
    #[error("emission frequency must be a positive number of seconds, got {0}")]
    InvalidFrequency(f64),

    /// A fixed sensor selection with no kinds in it.
    #[error("sensor selection is empty")]
    EmptySensorSelection,

    /// Random subset bounds that cannot yield a valid set.
    #[error("random subset must keep between 1 and 6 sensors, got minimum {min}")]
    InvalidSubsetMinimum { min: usize },

    /// A device would end up with no sensors.
    #[error("device {device_index} would have no sensors")]
    EmptySelectionForDevice { device_index: usize },
}

/// Policy for choosing each device's sensor set at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SensorSelection {
    /// Every device carries all six kinds.
    All,
    /// Every device carries exactly this subset.
    Fixed(BTreeSet<SensorKind>),
    /// Each device carries a random subset of at least `min_sensors` kinds.
    RandomSubset { min_sensors: usize },
}

impl Default for SensorSelection {
    fn default() -> Self {
        SensorSelection::All
    }
}

impl SensorSelection {
    /// The original per-device assignment: 4 to 6 of the 6 kinds.
    pub fn random() -> Self {
        SensorSelection::RandomSubset { min_sensors: 4 }
    }

    /// Draw the sensor set for one device.
    pub fn select(&self, rng: &mut (impl Rng + ?Sized)) -> BTreeSet<SensorKind> {
        match self {
            SensorSelection::All => SensorKind::ALL.into_iter().collect(),
            SensorSelection::Fixed(kinds) => kinds.clone(),
            SensorSelection::RandomSubset { min_sensors } => {
                let count = rng.gen_range(*min_sensors..=SensorKind::ALL.len());
                SensorKind::ALL
                    .choose_multiple(rng, count)
                    .copied()
                    .collect()
            }
        }
    }
}

/// Options accepted by the simulation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of devices in the fleet.
    pub device_count: usize,
    /// Seconds between ticks.
    pub frequency_seconds: f64,
    /// Ticks to run. `None` runs until cancelled; `Some(0)` completes
    /// immediately without emitting anything.
    pub reading_count: Option<u64>,
    /// Per-device sensor assignment policy.
    pub sensor_selection: SensorSelection,
    /// Random seed for reproducible runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            device_count: 10,
            frequency_seconds: 1.0,
            reading_count: None,
            sensor_selection: SensorSelection::All,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set fleet size.
    pub fn with_device_count(mut self, count: usize) -> Self {
        self.device_count = count;
        self
    }

    /// Set seconds between ticks.
    pub fn with_frequency_seconds(mut self, seconds: f64) -> Self {
        self.frequency_seconds = seconds;
        self
    }

    /// Bound the run to `count` ticks.
    pub fn with_reading_count(mut self, count: u64) -> Self {
        self.reading_count = Some(count);
        self
    }

    /// Run until cancelled.
    pub fn unbounded(mut self) -> Self {
        self.reading_count = None;
        self
    }

    /// Set the sensor assignment policy.
    pub fn with_sensor_selection(mut self, selection: SensorSelection) -> Self {
        self.sensor_selection = selection;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration. Fatal on failure; nothing has run yet.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_count < 1 {
            return Err(ConfigError::InvalidDeviceCount(self.device_count));
        }
        if !self.frequency_seconds.is_finite() || self.frequency_seconds <= 0.0 {
            return Err(ConfigError::InvalidFrequency(self.frequency_seconds));
        }
        match &self.sensor_selection {
            SensorSelection::Fixed(kinds) if kinds.is_empty() => {
                Err(ConfigError::EmptySensorSelection)
            }
            SensorSelection::RandomSubset { min_sensors }
                if *min_sensors < 1 || *min_sensors > SensorKind::ALL.len() =>
            {
                Err(ConfigError::InvalidSubsetMinimum { min: *min_sensors })
            }
            _ => Ok(()),
        }
    }
}
