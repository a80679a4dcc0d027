//! Simulated traffic and sample data configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate, ValidationError};

/// Simulator configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[validate(schema(function = validate_anomaly_budget))]
#[serde(default)]
pub struct SimulatorConfig {
    /// Pause between two simulated records (milliseconds).
    #[validate(range(min = 1, max = 60000))]
    pub emit_interval_ms: u64,

    /// Probability that a simulated record is oversized.
    #[validate(range(min = 0.0, max = 1.0))]
    pub anomaly_rate: f64,

    /// Seed for reproducible traffic; random when absent.
    pub seed: Option<u64>,

    /// Records in a sample batch.
    #[validate(range(min = 1, max = 1000000))]
    pub sample_size: usize,

    /// Seconds between consecutive sample records.
    #[validate(range(min = 0.001, max = 86400.0))]
    pub sample_spacing_secs: f64,

    /// Oversized records per sample batch.
    pub sample_anomalies: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            emit_interval_ms: 100,
            anomaly_rate: 0.05,
            seed: None,
            sample_size: 200,
            sample_spacing_secs: 18.0,
            sample_anomalies: 5,
        }
    }
}

fn validate_anomaly_budget(config: &SimulatorConfig) -> Result<(), ValidationError> {
    if config.sample_anomalies > config.sample_size {
        let mut error = ValidationError::new("anomaly_budget");
        error.message = Some("sample_anomalies must not exceed sample_size".into());
        return Err(error);
    }
    Ok(())
}
