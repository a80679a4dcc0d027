use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Session packet store configuration.
#[derive(Default, Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Retention cap; the oldest record is dropped beyond it. Unbounded when absent.
    #[validate(range(min = 1))]
    pub max_records: Option<usize>,
}
