// Sensorfleet - Reading assembly
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reading assembly and device state transitions.
//!
//! [`ReadingGenerator`] owns the run's random source and is the only place
//! device runtime state changes. Per reporting tick it redraws the status,
//! decays the battery, evolves every enabled sensor value (each with an
//! independent anomaly roll), jitters the site coordinate, and assembles
//! the immutable [`Reading`].

use crate::config::SimulationConfig;
use crate::device::DeviceProfile;
use crate::reading::{Coordinates, Reading};
use crate::sensor::{self, SensorKind};
use crate::status::{self, DeviceStatus};
use chrono::{DateTime, Utc};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use std::collections::BTreeMap;

/// Probability that a device reports on a given tick.
pub const DEFAULT_REPORT_PROBABILITY: f64 = 0.98;

/// Probability of an anomalous evolution for one sensor on one tick.
pub const DEFAULT_ANOMALY_PROBABILITY: f64 = 0.01;

/// Standard deviation of the per-axis coordinate jitter, in degrees
/// (roughly five meters).
const COORDINATE_JITTER_STD: f64 = 0.00005;

/// Assembles readings for the fleet and owns all randomness of a run.
pub struct ReadingGenerator {
    rng: StdRng,
    report_probability: f64,
    anomaly_probability: f64,
}

impl ReadingGenerator {
    /// Create a generator over an explicit random source.
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            report_probability: DEFAULT_REPORT_PROBABILITY,
            anomaly_probability: DEFAULT_ANOMALY_PROBABILITY,
        }
    }

    /// Create a deterministic generator from a seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Create a generator seeded from the OS.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Create a generator honoring the config's seed.
    pub fn from_config(config: &SimulationConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Override the reliability probability (clamped to [0, 1]).
    /// `1.0` disables suppressed readings.
    pub fn with_report_probability(mut self, probability: f64) -> Self {
        self.report_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Override the anomaly probability (clamped to [0, 1]).
    /// `0.0` disables anomaly injection.
    pub fn with_anomaly_probability(mut self, probability: f64) -> Self {
        self.anomaly_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Access the underlying random source, e.g. to create the fleet from
    /// the same seeded stream.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Produce one device's reading for the tick at `timestamp`, or `None`
    /// when the reliability roll suppresses it.
    ///
    /// A suppressed tick leaves the device untouched. A reporting tick
    /// mutates status, battery, and last values in place; exactly one
    /// evolution (normal or anomalous) is applied per sensor.
    pub fn generate(
        &mut self,
        device: &mut DeviceProfile,
        timestamp: DateTime<Utc>,
    ) -> Option<Reading> {
        if self.rng.gen::<f64>() >= self.report_probability {
            return None;
        }

        device.status = status::next_status(&mut self.rng);

        // Recharge is denied while the device is in error; the battery
        // level is exempt from anomaly injection so it stays monotone
        // outside recharge events.
        let recharge_allowed = device.status != DeviceStatus::Error;
        device.battery_level = sensor::next_value(
            SensorKind::Battery,
            device.battery_level,
            recharge_allowed,
            &mut self.rng,
        );

        let mut sensor_values = BTreeMap::new();
        for kind in device.sensor_types.iter().copied() {
            let value = if kind == SensorKind::Battery {
                device.battery_level
            } else {
                let previous = device.last_values[&kind];
                if self.rng.gen::<f64>() < self.anomaly_probability {
                    sensor::anomalous_value(kind, previous, &mut self.rng)
                } else {
                    sensor::next_value(kind, previous, true, &mut self.rng)
                }
            };
            device.last_values.insert(kind, value);
            sensor_values.insert(kind, value);
        }

        let jitter = Normal::new(0.0, COORDINATE_JITTER_STD).unwrap();
        let coordinates = Coordinates {
            latitude: device.location.base_latitude + jitter.sample(&mut self.rng),
            longitude: device.location.base_longitude + jitter.sample(&mut self.rng),
        };

        Some(Reading {
            device_id: device.device_id.clone(),
            timestamp,
            location_id: device.location.id.clone(),
            location_name: device.location.name.clone(),
            coordinates,
            status: device.status,
            sensor_values,
        })
    }
}
