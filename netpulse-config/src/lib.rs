//! # netpulse Configuration System
//!
//! Layered configuration for a capture session.
//!
//! ## Features
//! - **Unified Configuration**: one [`NetpulseConfig`] shared by every crate
//! - **Validation**: ranges, names and cross-field budgets checked at load time
//! - **Environment Awareness**: per-environment files and `NETPULSE_*` overrides

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

mod capture;
mod display;
mod error;
mod simulator;
mod store;
mod telemetry;
mod validation;

pub use capture::CaptureConfig;
pub use display::DisplayConfig;
pub use error::ConfigError;
pub use simulator::SimulatorConfig;
pub use store::StoreConfig;
pub use telemetry::{MetricsConfig, TelemetryConfig};

const BASE_FILE: &str = "config/netpulse.yaml";
const ENV_PREFIX: &str = "NETPULSE_";

/// Top‑level configuration container for all netpulse components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
#[serde(default)]
pub struct NetpulseConfig {
    /// Live capture parameters.
    #[validate(nested)]
    pub capture: CaptureConfig,

    /// Simulated traffic and sample data.
    #[validate(nested)]
    pub simulator: SimulatorConfig,

    /// Session store retention.
    #[validate(nested)]
    pub store: StoreConfig,

    /// Front-end refresh cadence.
    #[validate(nested)]
    pub display: DisplayConfig,

    /// Logging and metrics.
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl NetpulseConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default Values
    /// 2. `config/netpulse.yaml` - Base settings. If missing, defaults are used.
    /// 3. `config/<NETPULSE_ENV>.yaml` - Environment‑specific overrides.
    /// 4. `NETPULSE_*` environment variables, `__` separating nested keys.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(NetpulseConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        } else {
            debug!("{BASE_FILE} not found, using default configuration");
        }

        let env = std::env::var("NETPULSE_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{env}.yaml");
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::extract(figment)
    }

    /// Load configuration from a specific file, still layered over the
    /// defaults and under the environment.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment =
            Figment::from(Serialized::defaults(NetpulseConfig::default())).merge(Yaml::file(path));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn full_config_validation() {
        let config = NetpulseConfig::default();
        config.validate().expect("Default config should validate");
    }

    #[test]
    fn defaults_without_files() {
        Jail::expect_with(|_jail| {
            let config = NetpulseConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config, NetpulseConfig::default());
            Ok(())
        });
    }

    #[test]
    fn files_and_environment_layer() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/netpulse.yaml",
                r#"
                simulator:
                  sample_size: 50
                  sample_anomalies: 2
                display:
                  packet_rows: 5
                "#,
            )?;
            jail.create_file(
                "config/staging.yaml",
                r#"
                display:
                  packet_rows: 8
                "#,
            )?;
            jail.set_env("NETPULSE_ENV", "staging");
            jail.set_env("NETPULSE_SIMULATOR__SEED", "7");
            jail.set_env("NETPULSE_CAPTURE__BUFFER_SIZE", "2MiB");

            let config = NetpulseConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.simulator.sample_size, 50);
            assert_eq!(config.simulator.sample_anomalies, 2);
            assert_eq!(config.simulator.seed, Some(7));
            assert_eq!(config.display.packet_rows, 8);
            assert_eq!(config.capture.buffer_size, 2 * 1024 * 1024);
            assert_eq!(config.capture.interface, "any");
            Ok(())
        });
    }

    #[test]
    fn invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "bad.yaml",
                r#"
                simulator:
                  sample_size: 3
                  sample_anomalies: 10
                telemetry:
                  log_level: chatty
                "#,
            )?;
            match NetpulseConfig::load_from_path("bad.yaml") {
                Err(ConfigError::Validation(errors)) => {
                    let message = ConfigError::Validation(errors).to_string();
                    assert!(message.contains("simulator"));
                    assert!(message.contains("telemetry.log_level"));
                }
                other => panic!("expected validation error, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn missing_explicit_file() {
        assert!(matches!(
            NetpulseConfig::load_from_path("does/not/exist.yaml"),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
