use std::time::Duration;

/// Settings for the continuous simulated capture.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorOptions {
    /// Pause between two emitted records.
    pub emit_interval: Duration,
    /// Probability that a record is oversized.
    pub anomaly_rate: f64,
    pub seed: Option<u64>,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            emit_interval: Duration::from_millis(100),
            anomaly_rate: 0.05,
            seed: None,
        }
    }
}

/// Settings for a one-shot sample batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOptions {
    pub size: usize,
    /// Seconds between consecutive sample timestamps.
    pub spacing_secs: f64,
    /// Exact number of oversized records in the batch.
    pub anomalies: usize,
    pub seed: Option<u64>,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            size: 200,
            spacing_secs: 18.0,
            anomalies: 5,
            seed: None,
        }
    }
}
