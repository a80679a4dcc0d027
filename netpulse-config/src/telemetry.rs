//! Observability configuration.
//!
//! Parameters for system instrumentation:
//! - Log verbosity
//! - Metrics collection

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

#[derive(Default, Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Whether the CLI prints the metrics exposition on exit.
    pub report_on_exit: bool,
}

/// Telemetry configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Default log level when `RUST_LOG` is unset.
    #[validate(custom(function = validation::validate_log_level))]
    pub log_level: String,

    /// Metrics collection parameters.
    #[validate(nested)]
    pub metrics: MetricsConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            metrics: MetricsConfig::default(),
        }
    }
}
