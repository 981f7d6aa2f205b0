// Sensorfleet - Reading record and projections
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! The emitted telemetry record and its flattened tabular projection.
//!
//! A [`Reading`] is immutable once assembled; ownership passes straight to
//! the sink. [`FlatReading`] is the one-row-per-reading projection used by
//! CSV output; converting between the two forms is lossless.

use crate::sensor::SensorKind;
use crate::status::DeviceStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Jittered coordinate snapshot attached to a reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One emitted telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Emitting device.
    pub device_id: String,
    /// Tick time.
    pub timestamp: DateTime<Utc>,
    /// Site identifier.
    pub location_id: String,
    /// Site display name.
    pub location_name: String,
    /// Site base coordinate plus fresh per-tick jitter.
    pub coordinates: Coordinates,
    /// Device status as of this tick.
    pub status: DeviceStatus,
    /// Values for the device's enabled kinds only.
    pub sensor_values: BTreeMap<SensorKind, f64>,
}

impl Reading {
    /// Value for one kind, if the device reports it.
    pub fn value(&self, kind: SensorKind) -> Option<f64> {
        self.sensor_values.get(&kind).copied()
    }
}

/// Errors from parsing a flattened CSV row.
#[derive(Debug, Error)]
pub enum ReadingParseError {
    /// Row has fewer columns than the header.
    #[error("expected {expected} columns, got {actual}")]
    ColumnCount { expected: usize, actual: usize },

    /// Unparseable timestamp field.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Unparseable numeric field.
    #[error("invalid number in column {column}: {value}")]
    InvalidNumber { column: &'static str, value: String },

    /// Unknown status name.
    #[error("invalid status: {0}")]
    InvalidStatus(String),
}

/// Flattened tabular projection of a [`Reading`]: one column per sensor
/// kind, empty for kinds the device does not report.
///
/// Field values are written unquoted in CSV rows, so free-text fields must
/// not contain commas (the built-in site names do not).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatReading {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub location_id: String,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: DeviceStatus,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub light: Option<f64>,
    pub air_quality: Option<f64>,
    pub battery: Option<f64>,
}

impl FlatReading {
    /// CSV header matching [`FlatReading::to_csv_row`].
    pub const CSV_HEADER: &'static str = "device_id,timestamp,location_id,location_name,\
         latitude,longitude,status,temperature,humidity,pressure,light,air_quality,battery";

    const COLUMN_COUNT: usize = 13;

    /// Project a nested reading onto one row.
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            device_id: reading.device_id.clone(),
            timestamp: reading.timestamp,
            location_id: reading.location_id.clone(),
            location_name: reading.location_name.clone(),
            latitude: reading.coordinates.latitude,
            longitude: reading.coordinates.longitude,
            status: reading.status,
            temperature: reading.value(SensorKind::Temperature),
            humidity: reading.value(SensorKind::Humidity),
            pressure: reading.value(SensorKind::Pressure),
            light: reading.value(SensorKind::Light),
            air_quality: reading.value(SensorKind::AirQuality),
            battery: reading.value(SensorKind::Battery),
        }
    }

    /// Reconstruct the nested form. Empty columns become absent kinds, so
    /// `FlatReading::from_reading(r).to_reading() == r`.
    pub fn to_reading(&self) -> Reading {
        let mut sensor_values = BTreeMap::new();
        for kind in SensorKind::ALL {
            if let Some(value) = self.column(kind) {
                sensor_values.insert(kind, value);
            }
        }

        Reading {
            device_id: self.device_id.clone(),
            timestamp: self.timestamp,
            location_id: self.location_id.clone(),
            location_name: self.location_name.clone(),
            coordinates: Coordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            status: self.status,
            sensor_values,
        }
    }

    /// Value of one sensor column.
    pub fn column(&self, kind: SensorKind) -> Option<f64> {
        match kind {
            SensorKind::Temperature => self.temperature,
            SensorKind::Humidity => self.humidity,
            SensorKind::Pressure => self.pressure,
            SensorKind::Light => self.light,
            SensorKind::AirQuality => self.air_quality,
            SensorKind::Battery => self.battery,
        }
    }

    /// Format one CSV row (no trailing newline).
    pub fn to_csv_row(&self) -> String {
        let mut row = format!(
            "{},{},{},{},{},{},{}",
            self.device_id,
            self.timestamp.to_rfc3339(),
            self.location_id,
            self.location_name,
            self.latitude,
            self.longitude,
            self.status,
        );

        for kind in SensorKind::ALL {
            match self.column(kind) {
                Some(value) => row.push_str(&format!(",{value}")),
                None => row.push(','),
            }
        }

        row
    }

    /// Parse one CSV row written by [`FlatReading::to_csv_row`].
    pub fn from_csv_row(line: &str) -> Result<Self, ReadingParseError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != Self::COLUMN_COUNT {
            return Err(ReadingParseError::ColumnCount {
                expected: Self::COLUMN_COUNT,
                actual: fields.len(),
            });
        }

        let timestamp = DateTime::parse_from_rfc3339(fields[1])
            .map_err(|_| ReadingParseError::InvalidTimestamp(fields[1].to_string()))?
            .with_timezone(&Utc);

        let status = fields[6]
            .parse::<DeviceStatus>()
            .map_err(|_| ReadingParseError::InvalidStatus(fields[6].to_string()))?;

        Ok(Self {
            device_id: fields[0].to_string(),
            timestamp,
            location_id: fields[2].to_string(),
            location_name: fields[3].to_string(),
            latitude: parse_number("latitude", fields[4])?,
            longitude: parse_number("longitude", fields[5])?,
            status,
            temperature: parse_optional("temperature", fields[7])?,
            humidity: parse_optional("humidity", fields[8])?,
            pressure: parse_optional("pressure", fields[9])?,
            light: parse_optional("light", fields[10])?,
            air_quality: parse_optional("air_quality", fields[11])?,
            battery: parse_optional("battery", fields[12])?,
        })
    }
}

fn parse_number(column: &'static str, value: &str) -> Result<f64, ReadingParseError> {
    value.parse().map_err(|_| ReadingParseError::InvalidNumber {
        column,
        value: value.to_string(),
    })
}

fn parse_optional(column: &'static str, value: &str) -> Result<Option<f64>, ReadingParseError> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_number(column, value).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_reading() -> Reading {
        let mut sensor_values = BTreeMap::new();
        sensor_values.insert(SensorKind::Temperature, 21.5);
        sensor_values.insert(SensorKind::Battery, 97.3);

        Reading {
            device_id: "device_00c0ffee".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 15).unwrap(),
            location_id: "warehouse_a".to_string(),
            location_name: "Warehouse A".to_string(),
            coordinates: Coordinates {
                latitude: 47.60623,
                longitude: -122.33214,
            },
            status: DeviceStatus::Operational,
            sensor_values,
        }
    }

    #[test]
    fn test_value_lookup() {
        let reading = sample_reading();
        assert_eq!(reading.value(SensorKind::Temperature), Some(21.5));
        assert_eq!(reading.value(SensorKind::Humidity), None);
    }

    #[test]
    fn test_nested_json_shape() {
        let reading = sample_reading();
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&reading).unwrap()).unwrap();

        assert_eq!(json["device_id"], "device_00c0ffee");
        assert_eq!(json["status"], "operational");
        assert_eq!(json["sensor_values"]["temperature"], 21.5);
        assert_eq!(json["sensor_values"]["battery"], 97.3);
        assert!(json["sensor_values"].get("humidity").is_none());
        assert!(json["coordinates"]["latitude"].is_f64());
    }

    #[test]
    fn test_flat_roundtrip() {
        let reading = sample_reading();
        let flat = FlatReading::from_reading(&reading);

        assert_eq!(flat.temperature, Some(21.5));
        assert_eq!(flat.humidity, None);
        assert_eq!(flat.to_reading(), reading);
    }

    #[test]
    fn test_flat_json_roundtrip() {
        let reading = sample_reading();
        let flat = FlatReading::from_reading(&reading);

        let json = serde_json::to_string(&flat).unwrap();
        let reparsed: FlatReading = serde_json::from_str(&json).unwrap();

        assert_eq!(reparsed.to_reading(), reading);
    }

    #[test]
    fn test_csv_roundtrip() {
        let reading = sample_reading();
        let flat = FlatReading::from_reading(&reading);

        let row = flat.to_csv_row();
        let reparsed = FlatReading::from_csv_row(&row).unwrap();

        assert_eq!(reparsed, flat);
        assert_eq!(reparsed.to_reading(), reading);
    }

    #[test]
    fn test_csv_header_matches_row_shape() {
        let columns = FlatReading::CSV_HEADER.split(',').count();
        let row = FlatReading::from_reading(&sample_reading()).to_csv_row();
        assert_eq!(row.split(',').count(), columns);
    }

    #[test]
    fn test_csv_rejects_malformed_rows() {
        assert!(matches!(
            FlatReading::from_csv_row("only,three,columns"),
            Err(ReadingParseError::ColumnCount { .. })
        ));

        let mut row = FlatReading::from_reading(&sample_reading()).to_csv_row();
        row = row.replace("operational", "exploded");
        assert!(matches!(
            FlatReading::from_csv_row(&row),
            Err(ReadingParseError::InvalidStatus(_))
        ));
    }
}
