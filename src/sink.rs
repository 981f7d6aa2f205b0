// Sensorfleet - Output sinks
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Output destinations for emitted readings.
//!
//! The driver hands every produced reading to one [`Sink`]. A failed
//! `accept` is reported back per reading and logged by the driver, which
//! then moves on; a sink wanting retries or delivery guarantees implements
//! them itself.

use crate::reading::{FlatReading, Reading};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors a sink can report for one reading.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Record could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for emitted readings.
pub trait Sink {
    /// Consume one reading.
    fn accept(&mut self, reading: &Reading) -> Result<(), SinkError>;

    /// Flush buffered output. Called once when a run ends.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Prints readings to stdout as JSON, one record per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    pretty: bool,
}

impl ConsoleSink {
    /// Compact one-line records.
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Indented multi-line records.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Sink for ConsoleSink {
    fn accept(&mut self, reading: &Reading) -> Result<(), SinkError> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if self.pretty {
            serde_json::to_writer_pretty(&mut handle, reading)?;
        } else {
            serde_json::to_writer(&mut handle, reading)?;
        }
        handle.write_all(b"\n")?;
        Ok(())
    }
}

/// Writes newline-delimited JSON records to a file.
#[derive(Debug)]
pub struct JsonFileSink {
    writer: BufWriter<File>,
}

impl JsonFileSink {
    /// Create (truncate) the output file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }
}

impl Sink for JsonFileSink {
    fn accept(&mut self, reading: &Reading) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, reading)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the flattened tabular projection as CSV with a header row.
#[derive(Debug)]
pub struct CsvFileSink {
    writer: BufWriter<File>,
    header_written: bool,
}

impl CsvFileSink {
    /// Create (truncate) the output file. The header goes out with the
    /// first reading.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
            header_written: false,
        })
    }
}

impl Sink for CsvFileSink {
    fn accept(&mut self, reading: &Reading) -> Result<(), SinkError> {
        if !self.header_written {
            writeln!(self.writer, "{}", FlatReading::CSV_HEADER)?;
            self.header_written = true;
        }
        writeln!(self.writer, "{}", FlatReading::from_reading(reading).to_csv_row())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects readings in memory. Intended for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    readings: Vec<Reading>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected readings, in acceptance order.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Number of collected readings.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Take ownership of the collected readings.
    pub fn into_readings(self) -> Vec<Reading> {
        self.readings
    }
}

impl Sink for MemorySink {
    fn accept(&mut self, reading: &Reading) -> Result<(), SinkError> {
        self.readings.push(reading.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Coordinates;
    use crate::sensor::SensorKind;
    use crate::status::DeviceStatus;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;

    fn sample_reading(temperature: f64) -> Reading {
        let mut sensor_values = BTreeMap::new();
        sensor_values.insert(SensorKind::Temperature, temperature);

        Reading {
            device_id: "device_deadbeef".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            location_id: "office_main".to_string(),
            location_name: "Main Office".to_string(),
            coordinates: Coordinates {
                latitude: 47.6205,
                longitude: -122.3493,
            },
            status: DeviceStatus::Operational,
            sensor_values,
        }
    }

    #[test]
    fn test_memory_sink_collects_in_order() {
        let mut sink = MemorySink::new();
        sink.accept(&sample_reading(20.0)).unwrap();
        sink.accept(&sample_reading(21.0)).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(
            sink.readings()[0].value(SensorKind::Temperature),
            Some(20.0)
        );
        assert_eq!(
            sink.readings()[1].value(SensorKind::Temperature),
            Some(21.0)
        );
    }

    #[test]
    fn test_json_file_sink_writes_one_record_per_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("readings.jsonl");

        let mut sink = JsonFileSink::create(&path).unwrap();
        sink.accept(&sample_reading(20.0)).unwrap();
        sink.accept(&sample_reading(21.5)).unwrap();
        sink.flush().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Reading = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.value(SensorKind::Temperature), Some(20.0));
    }

    #[test]
    fn test_csv_file_sink_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("readings.csv");

        let mut sink = CsvFileSink::create(&path).unwrap();
        sink.accept(&sample_reading(20.0)).unwrap();
        sink.accept(&sample_reading(21.5)).unwrap();
        sink.flush().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], FlatReading::CSV_HEADER);

        let parsed = FlatReading::from_csv_row(lines[2]).unwrap();
        assert_eq!(parsed.temperature, Some(21.5));
        assert_eq!(parsed.to_reading(), sample_reading(21.5));
    }

    #[test]
    fn test_csv_file_roundtrip_preserves_readings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roundtrip.csv");

        let originals: Vec<_> = [19.5, 22.0, 24.5].into_iter().map(sample_reading).collect();

        let mut sink = CsvFileSink::create(&path).unwrap();
        for reading in &originals {
            sink.accept(reading).unwrap();
        }
        sink.flush().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let reparsed: Vec<Reading> = contents
            .lines()
            .skip(1)
            .map(|line| FlatReading::from_csv_row(line).unwrap().to_reading())
            .collect();

        assert_eq!(reparsed, originals);
    }
}
