//! Presentation cadence.
//!
//! The front end polls the session on these intervals; the capture itself is
//! never paced by them.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Packet list and statistics refresh (milliseconds).
    #[validate(range(min = 50, max = 60000))]
    pub refresh_interval_ms: u64,

    /// Traffic timeline refresh (milliseconds).
    #[validate(range(min = 100, max = 600000))]
    pub chart_interval_ms: u64,

    /// Width of a timeline bucket (seconds).
    #[validate(range(min = 1, max = 86400))]
    pub timeline_bucket_secs: u64,

    /// Newest packet rows printed per refresh.
    #[validate(range(min = 1, max = 10000))]
    pub packet_rows: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1000,
            chart_interval_ms: 10000,
            timeline_bucket_secs: 10,
            packet_rows: 20,
        }
    }
}
