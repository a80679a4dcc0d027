use thiserror::Error;

use netpulse_config::ConfigError;
use netpulse_engine::{ReportError, SessionError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Failed to serialize summary: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to gather metrics: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Packet {index} out of range (session has {len})")]
    PacketIndex { index: usize, len: usize },

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
