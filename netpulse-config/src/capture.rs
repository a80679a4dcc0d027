//! Live capture configuration.
//!
//! Parameters handed to the pcap backend when a live session starts.

use serde::{Deserialize, Deserializer, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Packet capture configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Network interface for live capture; `any` listens on all of them.
    #[validate(custom(function = validation::validate_interface))]
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Run in promiscuous mode?
    #[serde(default = "default_promiscuous")]
    pub promiscuous: bool,

    /// Bytes kept per captured frame.
    #[validate(range(min = 64, max = 262144))]
    #[serde(default = "default_snaplen")]
    pub snaplen: u32,

    /// Kernel capture buffer size in bytes.
    #[validate(range(min = 4096, max = 1073741824))]
    #[serde(default = "default_buffer_size", deserialize_with = "deserialize_size")]
    pub buffer_size: usize,

    /// Longest a blocking read may take before the stop signal is re-checked.
    #[validate(range(min = 1, max = 5000))]
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u32,
}

fn default_interface() -> String {
    "any".into()
}

fn default_promiscuous() -> bool {
    true
}

fn default_snaplen() -> u32 {
    65535
}

fn default_buffer_size() -> usize {
    1048576
}

fn default_read_timeout() -> u32 {
    250
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeValue {
    Num(usize),
    Str(String),
}

/// Custom deserializer to allow human‑friendly sizes (e.g. "1MiB") or direct numbers.
fn deserialize_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    match SizeValue::deserialize(deserializer)? {
        SizeValue::Num(n) => Ok(n),
        SizeValue::Str(s) => parse_size(&s).map_err(serde::de::Error::custom),
    }
}

fn parse_size(raw: &str) -> Result<usize, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (num_part, unit_part) = raw.split_at(split);
    let number: f64 = num_part
        .parse()
        .map_err(|e| format!("invalid size '{raw}': {e}"))?;
    let multiplier = match unit_part.trim().to_lowercase().as_str() {
        "kb" | "kib" => 1024.0,
        "mb" | "mib" => 1024.0 * 1024.0,
        "gb" | "gib" => 1024.0 * 1024.0 * 1024.0,
        "" | "b" => 1.0,
        unit => return Err(format!("unknown size unit '{unit}'")),
    };
    Ok((number * multiplier) as usize)
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            promiscuous: default_promiscuous(),
            snaplen: default_snaplen(),
            buffer_size: default_buffer_size(),
            read_timeout_ms: default_read_timeout(),
        }
    }
}
