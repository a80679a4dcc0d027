//! # Source options from configuration
//!
//! Maps the validated configuration sections onto the option structs the
//! capture and simulator crates take.

use std::time::Duration;

use netpulse_capture::LiveCaptureOptions;
use netpulse_config::{CaptureConfig, SimulatorConfig};
use netpulse_simulator::{SampleOptions, SimulatorOptions};

fn clamp_i32<T: TryInto<i32>>(value: T) -> i32 {
    value.try_into().unwrap_or(i32::MAX)
}

pub fn live_capture_options(config: &CaptureConfig) -> LiveCaptureOptions {
    LiveCaptureOptions {
        interface: config.interface.clone(),
        promiscuous: config.promiscuous,
        snaplen: clamp_i32(config.snaplen),
        buffer_size: clamp_i32(config.buffer_size),
        read_timeout_ms: clamp_i32(config.read_timeout_ms),
    }
}

pub fn simulator_options(config: &SimulatorConfig) -> SimulatorOptions {
    SimulatorOptions {
        emit_interval: Duration::from_millis(config.emit_interval_ms),
        anomaly_rate: config.anomaly_rate,
        seed: config.seed,
    }
}

pub fn sample_options(config: &SimulatorConfig) -> SampleOptions {
    SampleOptions {
        size: config.sample_size,
        spacing_secs: config.sample_spacing_secs,
        anomalies: config.sample_anomalies,
        seed: config.seed,
    }
}
