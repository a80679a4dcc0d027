use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("A capture is already running")]
    AlreadyCapturing,

    #[error("Stop the running capture first")]
    CaptureInProgress,

    #[error("Failed to spawn capture worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),
}
