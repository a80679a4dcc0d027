use thiserror::Error;

use netpulse_core::{PacketRecord, StopToken};

/// Reasons a source could not start or had to stop.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Capture backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Capture device '{0}' not found")]
    DeviceNotFound(String),

    #[error("Capture failed: {0}")]
    Capture(String),
}

/// A producer of packet records.
///
/// `run` is called once, on a dedicated thread. It hands every record to
/// `sink` exactly once, in emission order, and returns when `stop` is
/// cancelled (`Ok`) or when it cannot continue (`Err`). Implementations check
/// `stop` at least once per emitted record and must not panic on bad input.
pub trait PacketSource: Send {
    /// Short name, used for thread names and logs.
    fn name(&self) -> &'static str;

    /// Whether the records describe real traffic.
    fn is_live(&self) -> bool;

    fn run(
        &mut self,
        sink: &mut dyn FnMut(PacketRecord),
        stop: &StopToken,
    ) -> Result<(), SourceError>;
}

impl<S: PacketSource + ?Sized> PacketSource for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn is_live(&self) -> bool {
        (**self).is_live()
    }

    fn run(
        &mut self,
        sink: &mut dyn FnMut(PacketRecord),
        stop: &StopToken,
    ) -> Result<(), SourceError> {
        (**self).run(sink, stop)
    }
}
