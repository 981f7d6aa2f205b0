// Sensorfleet - Stream driver
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Tick loop over the fleet.
//!
//! One logical clock drives all devices sequentially within each tick, so
//! no locking is needed anywhere. Cancellation is observed at tick
//! boundaries only: a tick's readings are either fully emitted or not
//! begun.

use crate::config::SimulationConfig;
use crate::device::DeviceProfile;
use crate::generator::ReadingGenerator;
use crate::sink::Sink;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shared cancellation flag, flipped by an external signal handler and
/// observed by the driver between ticks.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop at the next tick boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed ticks.
    pub ticks: u64,
    /// Readings handed to the sink.
    pub emitted: u64,
    /// Reliability-suppressed device ticks.
    pub suppressed: u64,
    /// Readings the sink rejected (plus a failed final flush).
    pub sink_failures: u64,
}

/// Drives the fleet through ticks at a fixed cadence.
pub struct StreamDriver {
    interval: Duration,
    tick_limit: Option<u64>,
}

impl StreamDriver {
    /// Create a driver. `tick_limit` of `None` runs until cancelled.
    pub fn new(interval: Duration, tick_limit: Option<u64>) -> Self {
        Self {
            interval,
            tick_limit,
        }
    }

    /// Create a driver from a validated config.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            Duration::from_secs_f64(config.frequency_seconds),
            config.reading_count,
        )
    }

    /// Run the simulation.
    ///
    /// Per tick: one timestamp, every device in creation order, produced
    /// readings forwarded to the sink. Sink failures are logged and
    /// counted but never halt the run. Returns after `tick_limit` ticks,
    /// or at the first tick boundary where `cancel` is set.
    pub fn run(
        &self,
        fleet: &mut [DeviceProfile],
        generator: &mut ReadingGenerator,
        sink: &mut dyn Sink,
        cancel: &CancelFlag,
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        info!(
            devices = fleet.len(),
            interval_ms = self.interval.as_millis() as u64,
            ticks = ?self.tick_limit,
            "starting stream"
        );

        loop {
            if let Some(limit) = self.tick_limit {
                if summary.ticks >= limit {
                    break;
                }
            }
            if cancel.is_cancelled() {
                info!(ticks = summary.ticks, "cancelled at tick boundary");
                break;
            }
            if summary.ticks > 0 && !self.interval.is_zero() {
                thread::sleep(self.interval);
                if cancel.is_cancelled() {
                    info!(ticks = summary.ticks, "cancelled at tick boundary");
                    break;
                }
            }

            let timestamp = Utc::now();
            for device in fleet.iter_mut() {
                match generator.generate(device, timestamp) {
                    Some(reading) => {
                        summary.emitted += 1;
                        if let Err(err) = sink.accept(&reading) {
                            summary.sink_failures += 1;
                            warn!(
                                device_id = %reading.device_id,
                                error = %err,
                                "sink rejected reading"
                            );
                        }
                    }
                    None => {
                        summary.suppressed += 1;
                        debug!(device_id = %device.device_id, "reading suppressed");
                    }
                }
            }

            summary.ticks += 1;
        }

        if let Err(err) = sink.flush() {
            summary.sink_failures += 1;
            warn!(error = %err, "sink flush failed");
        }

        info!(
            ticks = summary.ticks,
            emitted = summary.emitted,
            suppressed = summary.suppressed,
            sink_failures = summary.sink_failures,
            "stream finished"
        );

        summary
    }
}
