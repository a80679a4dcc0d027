use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::Sender;
use opentelemetry::KeyValue;
use tracing::{debug, warn};

use netpulse_capture::PacketSource;
use netpulse_core::{PacketStore, StopToken};
use netpulse_telemetry::{EventLogger, MetricsRecorder};

use super::status::StatusEvent;

/// A source running on its own thread.
pub(crate) struct CaptureWorker {
    stop: StopToken,
    handle: JoinHandle<()>,
}

impl CaptureWorker {
    /// Runs `source` on a thread named `netpulse-<source>`, appending every
    /// record to `store`.
    ///
    /// When the source returns, for any reason, the worker cancels its own
    /// token and sends `CaptureStopped`, preceded by `Error` if it failed.
    pub(crate) fn spawn(
        mut source: Box<dyn PacketSource>,
        store: Arc<PacketStore>,
        status: Sender<StatusEvent>,
        metrics: MetricsRecorder,
    ) -> io::Result<Self> {
        let stop = StopToken::new();
        let token = stop.clone();
        let name = source.name();

        let handle = thread::Builder::new()
            .name(format!("netpulse-{name}"))
            .spawn(move || {
                let result = source.run(
                    &mut |record| metrics.record_packet(store.append(record)),
                    &token,
                );
                if let Err(e) = result {
                    warn!(source = name, "Capture source failed: {e}");
                    metrics.record_capture_error();
                    EventLogger::log_event(
                        "capture_error",
                        vec![
                            KeyValue::new("source", name),
                            KeyValue::new("error", e.to_string()),
                        ],
                    );
                    let _ = status.send(StatusEvent::Error(e.to_string()));
                }
                token.cancel();
                metrics.set_store_records(store.len());
                debug!(source = name, records = store.len(), "Capture worker exiting");
                let _ = status.send(StatusEvent::CaptureStopped);
            })?;

        Ok(Self { stop, handle })
    }

    /// Whether the source is still producing.
    pub(crate) fn is_running(&self) -> bool {
        !self.stop.is_cancelled() && !self.handle.is_finished()
    }

    /// Cancels the source and waits for the thread. Returns whether it was
    /// still running.
    pub(crate) fn shutdown(self) -> bool {
        let was_running = !self.stop.is_cancelled();
        self.stop.cancel();
        if self.handle.join().is_err() {
            warn!("Capture worker panicked");
        }
        was_running
    }
}
