// Sensorfleet - Device profiles
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Device profiles and fleet creation.
//!
//! A [`DeviceProfile`] holds one device's identity and its mutable runtime
//! state. Identity (id, location, sensor set) is fixed at creation; runtime
//! state (last values, battery, status) changes only inside
//! [`crate::generator::ReadingGenerator::generate`].

use crate::config::{ConfigError, SimulationConfig};
use crate::location::{Location, LocationRegistry};
use crate::sensor::SensorKind;
use crate::status::DeviceStatus;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// One simulated device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    /// Stable for the lifetime of the run.
    pub device_id: String,
    /// Site snapshot taken from the registry at creation.
    pub location: Location,
    /// Kinds this device reports. Never changes after creation.
    pub sensor_types: BTreeSet<SensorKind>,
    /// Last emitted value per kind.
    pub last_values: BTreeMap<SensorKind, f64>,
    /// Battery charge in percent, tracked whether or not the battery
    /// sensor is in `sensor_types`.
    pub battery_level: f64,
    /// Status as of the last reporting tick.
    pub status: DeviceStatus,
}

impl DeviceProfile {
    /// Create a device with baseline values and operational status.
    pub fn new(device_id: String, location: Location, sensor_types: BTreeSet<SensorKind>) -> Self {
        let last_values = sensor_types
            .iter()
            .map(|kind| (*kind, kind.spec().baseline))
            .collect();

        Self {
            device_id,
            location,
            sensor_types,
            last_values,
            battery_level: SensorKind::Battery.spec().baseline,
            status: DeviceStatus::Operational,
        }
    }

    /// Whether this device reports the given kind.
    pub fn reports(&self, kind: SensorKind) -> bool {
        self.sensor_types.contains(&kind)
    }
}

/// Create the simulated fleet described by `config`.
///
/// Each device gets a unique id drawn from `rng` (so seeded runs reproduce
/// ids), a site from the registry, and a sensor set from the configured
/// selection policy. Fails before any device is returned if the fleet size
/// is invalid or any device would end up with no sensors.
pub fn create_fleet(
    config: &SimulationConfig,
    registry: &LocationRegistry,
    rng: &mut (impl Rng + ?Sized),
) -> Result<Vec<DeviceProfile>, ConfigError> {
    if config.device_count < 1 {
        return Err(ConfigError::InvalidDeviceCount(config.device_count));
    }

    let mut fleet = Vec::with_capacity(config.device_count);
    let mut taken_ids = HashSet::with_capacity(config.device_count);

    for device_index in 0..config.device_count {
        let sensor_types = config.sensor_selection.select(rng);
        if sensor_types.is_empty() {
            return Err(ConfigError::EmptySelectionForDevice { device_index });
        }

        let mut device_id = format!("device_{:08x}", rng.gen::<u32>());
        while !taken_ids.insert(device_id.clone()) {
            device_id = format!("device_{:08x}", rng.gen::<u32>());
        }

        let location = registry.assign(rng).clone();
        fleet.push(DeviceProfile::new(device_id, location, sensor_types));
    }

    Ok(fleet)
}
