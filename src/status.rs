// Sensorfleet - Device status model
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Operational status model.
//!
//! Each reporting tick redraws the device status from a fixed categorical
//! distribution. The draw is memoryless: any status can follow any other
//! with the same probabilities, so a device in `Error` may report
//! `Operational` on the very next tick. There is no repair delay or
//! transition restriction.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Operational status reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Operational,
    Maintenance,
    Warning,
    Error,
}

/// Fixed categorical weights, in draw order. Sums to 1.
pub const STATUS_WEIGHTS: [(DeviceStatus, f64); 4] = [
    (DeviceStatus::Operational, 0.95),
    (DeviceStatus::Maintenance, 0.03),
    (DeviceStatus::Warning, 0.015),
    (DeviceStatus::Error, 0.005),
];

/// Draw the status for the current tick.
pub fn next_status(rng: &mut (impl Rng + ?Sized)) -> DeviceStatus {
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (status, weight) in STATUS_WEIGHTS {
        cumulative += weight;
        if roll < cumulative {
            return status;
        }
    }
    // Unreachable while the weights sum to 1; guards float rounding.
    DeviceStatus::Operational
}

impl DeviceStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Operational => "operational",
            DeviceStatus::Maintenance => "maintenance",
            DeviceStatus::Warning => "warning",
            DeviceStatus::Error => "error",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown device status: {0}")]
pub struct ParseStatusError(String);

impl FromStr for DeviceStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operational" => Ok(DeviceStatus::Operational),
            "maintenance" => Ok(DeviceStatus::Maintenance),
            "warning" => Ok(DeviceStatus::Warning),
            "error" => Ok(DeviceStatus::Error),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
