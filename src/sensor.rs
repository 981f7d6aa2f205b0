// Sensorfleet - Sensor value model
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Per-kind sensor value evolution.
//!
//! Every kind carries a static [`SensorSpec`] describing its unit, normal
//! operating bounds, hard physical bounds, drift step, and baseline. Normal
//! evolution is a bounded random walk clamped to the normal bounds; battery
//! instead decays with an occasional bounded recharge. Anomalous evolution
//! amplifies the deviation well past the normal bounds but never past the
//! hard bounds.
//!
//! All evolution functions are pure transformations of
//! `(previous_value, spec, rng draws)`; state lives on the device profile.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kinds of sensors a device can carry.
///
/// The variant order is the emission order within a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Temperature,
    Humidity,
    Pressure,
    Light,
    AirQuality,
    Battery,
}

/// Static characteristics of one sensor kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSpec {
    /// Unit of measurement.
    pub unit: &'static str,
    /// Lower normal operating bound; drift never goes below it.
    pub min: f64,
    /// Upper normal operating bound.
    pub max: f64,
    /// Lower hard physical bound; anomalies never go below it.
    pub hard_min: f64,
    /// Upper hard physical bound.
    pub hard_max: f64,
    /// Maximum magnitude of one drift step.
    pub typical_step: f64,
    /// Initial value for a freshly created device.
    pub baseline: f64,
    /// Emitted decimal places.
    pub precision: u32,
}

const TEMPERATURE: SensorSpec = SensorSpec {
    unit: "°C",
    min: -10.0,
    max: 45.0,
    hard_min: -40.0,
    hard_max: 85.0,
    typical_step: 0.1,
    baseline: 22.0,
    precision: 1,
};

const HUMIDITY: SensorSpec = SensorSpec {
    unit: "%",
    min: 0.0,
    max: 100.0,
    // Faulty capacitive sensors report past saturation.
    hard_min: 0.0,
    hard_max: 120.0,
    typical_step: 2.0,
    baseline: 55.0,
    precision: 1,
};

const PRESSURE: SensorSpec = SensorSpec {
    unit: "hPa",
    min: 970.0,
    max: 1050.0,
    hard_min: 870.0,
    hard_max: 1150.0,
    typical_step: 0.5,
    baseline: 1013.0,
    precision: 1,
};

const LIGHT: SensorSpec = SensorSpec {
    unit: "lux",
    min: 0.0,
    max: 10_000.0,
    hard_min: 0.0,
    // Direct sunlight.
    hard_max: 120_000.0,
    typical_step: 50.0,
    baseline: 450.0,
    precision: 0,
};

const AIR_QUALITY: SensorSpec = SensorSpec {
    unit: "µg/m³",
    min: 0.0,
    max: 500.0,
    hard_min: 0.0,
    hard_max: 1000.0,
    typical_step: 5.0,
    baseline: 12.0,
    precision: 1,
};

const BATTERY: SensorSpec = SensorSpec {
    unit: "%",
    min: 0.0,
    max: 100.0,
    hard_min: 0.0,
    hard_max: 100.0,
    typical_step: 0.1,
    baseline: 100.0,
    precision: 1,
};

/// Per-tick battery decay, drawn uniformly from this range (%).
const BATTERY_DECAY_RANGE: (f64, f64) = (0.05, 0.3);

/// Probability of a recharge event on a tick where recharge is allowed.
const RECHARGE_PROBABILITY: f64 = 0.01;

/// Charge recovered by one recharge event (%).
const RECHARGE_RANGE: (f64, f64) = (0.5, 4.0);

/// Anomalous deviations are amplified by a factor in this range.
const ANOMALY_FACTOR_RANGE: (f64, f64) = (2.0, 5.0);

impl SensorKind {
    /// All kinds, in emission order.
    pub const ALL: [SensorKind; 6] = [
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::Pressure,
        SensorKind::Light,
        SensorKind::AirQuality,
        SensorKind::Battery,
    ];

    /// Static characteristics of this kind.
    pub fn spec(&self) -> &'static SensorSpec {
        match self {
            SensorKind::Temperature => &TEMPERATURE,
            SensorKind::Humidity => &HUMIDITY,
            SensorKind::Pressure => &PRESSURE,
            SensorKind::Light => &LIGHT,
            SensorKind::AirQuality => &AIR_QUALITY,
            SensorKind::Battery => &BATTERY,
        }
    }

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Humidity => "humidity",
            SensorKind::Pressure => "pressure",
            SensorKind::Light => "light",
            SensorKind::AirQuality => "air_quality",
            SensorKind::Battery => "battery",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for parsing an unknown sensor kind name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sensor kind: {0}")]
pub struct ParseSensorKindError(String);

impl FromStr for SensorKind {
    type Err = ParseSensorKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(SensorKind::Temperature),
            "humidity" => Ok(SensorKind::Humidity),
            "pressure" => Ok(SensorKind::Pressure),
            "light" => Ok(SensorKind::Light),
            "air_quality" => Ok(SensorKind::AirQuality),
            "battery" => Ok(SensorKind::Battery),
            other => Err(ParseSensorKindError(other.to_string())),
        }
    }
}

/// Evolve one sensor value by one tick.
///
/// Non-battery kinds take a uniform step in `[-typical_step, +typical_step]`
/// and are clamped to the normal bounds. Battery decays by a small positive
/// draw; while `recharge_allowed` there is a low-probability bounded
/// recovery, so the level is non-increasing whenever recharge is denied.
/// The result is rounded to the kind's declared precision.
pub fn next_value(
    kind: SensorKind,
    previous: f64,
    recharge_allowed: bool,
    rng: &mut (impl Rng + ?Sized),
) -> f64 {
    let spec = kind.spec();
    let next = match kind {
        SensorKind::Battery => {
            let decay = rng.gen_range(BATTERY_DECAY_RANGE.0..=BATTERY_DECAY_RANGE.1);
            let recharge = if recharge_allowed && rng.gen::<f64>() < RECHARGE_PROBABILITY {
                rng.gen_range(RECHARGE_RANGE.0..=RECHARGE_RANGE.1)
            } else {
                0.0
            };
            previous - decay + recharge
        }
        _ => {
            let step = rng.gen_range(-spec.typical_step..=spec.typical_step);
            previous + step
        }
    };

    round_to(next.clamp(spec.min, spec.max), spec.precision)
}

/// Evolve one sensor value anomalously.
///
/// The previous value is either multiplied by, or offset by half a range
/// width times, a factor of 2 to 5. The result may escape the normal
/// bounds (that is the point: anomalies must be detectable downstream) but
/// is clamped to the hard physical bounds.
pub fn anomalous_value(kind: SensorKind, previous: f64, rng: &mut (impl Rng + ?Sized)) -> f64 {
    let spec = kind.spec();
    let factor = rng.gen_range(ANOMALY_FACTOR_RANGE.0..=ANOMALY_FACTOR_RANGE.1);

    let surged = if rng.gen::<bool>() {
        previous * factor
    } else {
        let direction = if rng.gen::<bool>() { 1.0 } else { -1.0 };
        previous + direction * factor * (spec.max - spec.min) / 2.0
    };

    round_to(surged.clamp(spec.hard_min, spec.hard_max), spec.precision)
}

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}
