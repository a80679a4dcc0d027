use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use crossbeam::channel::{unbounded, Receiver, Sender};
use opentelemetry::KeyValue;
use parking_lot::Mutex;
use tracing::{info, instrument, warn};

use netpulse_capture::{LiveCapture, PacketSource};
use netpulse_config::NetpulseConfig;
use netpulse_core::{PacketRecord, PacketStore, StoreCursor, StoreDelta};
use netpulse_simulator::{generate_sample_batch, Clock, Simulator, SystemClock};
use netpulse_stats::{compute, timeline, CaptureType, TimeBucket, TrafficSummary};
use netpulse_telemetry::{EventLogger, MetricsRecorder};

use super::error::SessionError;
use super::status::StatusEvent;
use super::worker::CaptureWorker;
use crate::options;
use crate::report::{self, ReportError};

/// Which source `start` should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Real traffic, falling back to the simulator when capture is unavailable.
    Live,
    Simulated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Capturing,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub records: Vec<PacketRecord>,
    pub summary: TrafficSummary,
    pub phase: SessionPhase,
    pub capture_type: CaptureType,
}

/// A source ready to launch, and why live capture was skipped, if it was.
struct OpenedSource {
    source: Box<dyn PacketSource>,
    fallback: Option<String>,
}

#[derive(Default)]
struct SessionState {
    worker: Option<CaptureWorker>,
    is_real_capture: bool,
}

/// Owns the capture lifecycle and the session store.
///
/// Every method takes `&self`; the controller can be shared between the
/// presentation layer and anything else that needs to poll it.
pub struct SessionController {
    config: NetpulseConfig,
    store: Arc<PacketStore>,
    state: Mutex<SessionState>,
    status_tx: Sender<StatusEvent>,
    status_rx: Receiver<StatusEvent>,
    metrics: MetricsRecorder,
    clock: Arc<dyn Clock>,
}

impl SessionController {
    pub fn new(config: NetpulseConfig) -> Result<Self, SessionError> {
        Ok(Self::with_metrics(config, MetricsRecorder::new()?))
    }

    pub fn with_metrics(config: NetpulseConfig, metrics: MetricsRecorder) -> Self {
        let (status_tx, status_rx) = unbounded();
        Self {
            store: Arc::new(PacketStore::new(config.store.max_records)),
            config,
            state: Mutex::new(SessionState::default()),
            status_tx,
            status_rx,
            metrics,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for simulated timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &NetpulseConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// A receiver for status events. Receivers share one queue: each event
    /// goes to exactly one of them.
    pub fn status_events(&self) -> Receiver<StatusEvent> {
        self.status_rx.clone()
    }

    fn notify(&self, event: StatusEvent) {
        // The controller holds a receiver, so the channel never disconnects.
        let _ = self.status_tx.send(event);
    }

    /// Joins a worker whose source already ended on its own.
    fn reap(state: &mut SessionState) {
        if state.worker.as_ref().is_some_and(|w| !w.is_running()) {
            if let Some(worker) = state.worker.take() {
                worker.shutdown();
            }
        }
    }

    fn simulator(&self) -> Simulator {
        Simulator::with_clock(
            options::simulator_options(&self.config.simulator),
            Arc::clone(&self.clock),
        )
    }

    /// Starts capturing. Returns the kind of data the session now collects.
    ///
    /// `CaptureMode::Live` never fails for lack of a capture backend: it emits
    /// `BackendUnavailable` and runs the simulator instead. The backend is
    /// opened without holding the session lock, so pollers are never held up
    /// by device activation.
    #[instrument(level = "info", name = "session_start", skip(self))]
    pub fn start(&self, mode: CaptureMode) -> Result<CaptureType, SessionError> {
        self.start_opening(|session| session.open_source(mode))
    }

    fn open_source(&self, mode: CaptureMode) -> OpenedSource {
        match mode {
            CaptureMode::Live => {
                let live = options::live_capture_options(&self.config.capture);
                match LiveCapture::open(&live) {
                    Ok(capture) => OpenedSource {
                        source: Box::new(capture),
                        fallback: None,
                    },
                    Err(e) => {
                        warn!(interface = %live.interface, "Falling back to simulator: {e}");
                        OpenedSource {
                            source: Box::new(self.simulator()),
                            fallback: Some(e.to_string()),
                        }
                    }
                }
            }
            CaptureMode::Simulated => OpenedSource {
                source: Box::new(self.simulator()),
                fallback: None,
            },
        }
    }

    /// Checks the session is idle, runs `open` unlocked, then launches the
    /// opened source if no other start won the race in between.
    fn start_opening<F>(&self, open: F) -> Result<CaptureType, SessionError>
    where
        F: FnOnce(&Self) -> OpenedSource,
    {
        {
            let mut state = self.state.lock();
            Self::reap(&mut state);
            if state.worker.is_some() {
                return Err(SessionError::AlreadyCapturing);
            }
        }

        let opened = open(self);

        let mut state = self.state.lock();
        Self::reap(&mut state);
        if state.worker.is_some() {
            return Err(SessionError::AlreadyCapturing);
        }
        if let Some(reason) = opened.fallback {
            self.notify(StatusEvent::BackendUnavailable(reason));
        }
        self.launch(&mut state, opened.source)
    }

    /// Starts capturing from a caller-provided source.
    #[instrument(level = "info", name = "session_start_with", skip_all)]
    pub fn start_with(&self, source: Box<dyn PacketSource>) -> Result<CaptureType, SessionError> {
        let mut state = self.state.lock();
        Self::reap(&mut state);
        if state.worker.is_some() {
            return Err(SessionError::AlreadyCapturing);
        }
        self.launch(&mut state, source)
    }

    fn launch(
        &self,
        state: &mut SessionState,
        source: Box<dyn PacketSource>,
    ) -> Result<CaptureType, SessionError> {
        let real = source.is_live();
        let name = source.name();
        self.notify(StatusEvent::CaptureStarted { real });

        let worker = match CaptureWorker::spawn(
            source,
            Arc::clone(&self.store),
            self.status_tx.clone(),
            self.metrics.clone(),
        ) {
            Ok(worker) => worker,
            Err(e) => {
                self.notify(StatusEvent::CaptureStopped);
                return Err(e.into());
            }
        };

        state.worker = Some(worker);
        state.is_real_capture = real;
        info!(source = name, real, "Capture started");
        EventLogger::log_event(
            "capture_started",
            vec![KeyValue::new("source", name), KeyValue::new("real", real)],
        );
        Ok(CaptureType::from_real(real))
    }

    /// Stops the running capture and waits for its worker. Returns whether a
    /// capture was running.
    #[instrument(level = "info", name = "session_stop", skip(self))]
    pub fn stop(&self) -> bool {
        let worker = self.state.lock().worker.take();
        let was_running = worker.is_some_and(CaptureWorker::shutdown);
        if was_running {
            info!(records = self.store.len(), "Capture stopped");
        }
        was_running
    }

    /// Replaces the store content with a fresh sample batch. Returns the
    /// batch size.
    #[instrument(level = "info", name = "session_load_sample", skip(self))]
    pub fn load_sample(&self) -> Result<usize, SessionError> {
        let mut state = self.state.lock();
        Self::reap(&mut state);
        if state.worker.is_some() {
            return Err(SessionError::CaptureInProgress);
        }

        let batch = generate_sample_batch(
            &options::sample_options(&self.config.simulator),
            self.clock.as_ref(),
        );
        let count = batch.len();
        self.store.replace(batch);
        state.is_real_capture = false;
        drop(state);

        self.metrics.set_store_records(self.store.len());
        info!(count, "Sample data loaded");
        self.notify(StatusEvent::SampleLoaded { count });
        Ok(count)
    }

    /// Stops any running capture and empties the store.
    ///
    /// The store is emptied under the session lock once no worker is left,
    /// so a `start` racing with `clear` either is stopped by it or runs
    /// entirely after it.
    #[instrument(level = "info", name = "session_clear", skip(self))]
    pub fn clear(&self) {
        loop {
            let mut state = self.state.lock();
            match state.worker.take() {
                Some(worker) => {
                    drop(state);
                    worker.shutdown();
                }
                None => {
                    state.is_real_capture = false;
                    self.store.clear();
                    break;
                }
            }
        }
        self.metrics.set_store_records(0);
        info!("Session cleared");
        self.notify(StatusEvent::Cleared);
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.state.lock().worker {
            Some(worker) if worker.is_running() => SessionPhase::Capturing,
            _ => SessionPhase::Idle,
        }
    }

    pub fn is_real_capture(&self) -> bool {
        self.state.lock().is_real_capture
    }

    pub fn capture_type(&self) -> CaptureType {
        CaptureType::from_real(self.is_real_capture())
    }

    /// Records plus their summary. Never waits on the source.
    pub fn snapshot(&self) -> SessionSnapshot {
        let (phase, capture_type) = (self.phase(), self.capture_type());
        let records = self.store.snapshot();
        let timer = self.metrics.stats_compute.start_timer();
        let summary = compute(&records, capture_type);
        timer.observe_duration();
        self.metrics.set_store_records(records.len());

        SessionSnapshot {
            records,
            summary,
            phase,
            capture_type,
        }
    }

    pub fn cursor(&self) -> StoreCursor {
        self.store.cursor()
    }

    /// Records appended since `cursor`; see [`PacketStore::read_since`].
    pub fn read_since(&self, cursor: StoreCursor) -> StoreDelta {
        self.store.read_since(cursor)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn timeline(&self, bucket_secs: u64) -> Vec<TimeBucket> {
        timeline(&self.store.snapshot(), bucket_secs)
    }

    /// Writes a text report of the current session into `dir`.
    #[instrument(level = "info", name = "session_export", skip(self, dir))]
    pub fn export_report(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        let snapshot = self.snapshot();
        let path = report::write_report(
            dir,
            &snapshot.records,
            &snapshot.summary,
            snapshot.capture_type,
            &Local::now(),
        )?;
        EventLogger::log_event(
            "report_exported",
            vec![
                KeyValue::new("path", path.display().to_string()),
                KeyValue::new("records", snapshot.records.len() as i64),
            ],
        );
        Ok(path)
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(worker) = self.state.get_mut().worker.take() {
            worker.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netpulse_simulator::VirtualClock;
    use tracing_test::traced_test;

    fn session() -> SessionController {
        let mut config = NetpulseConfig::default();
        config.simulator.emit_interval_ms = 1;
        SessionController::new(config).unwrap()
    }

    #[cfg(not(feature = "live-capture"))]
    #[test]
    #[traced_test]
    fn live_fallback_is_logged() {
        let session = session();
        assert_eq!(session.start(CaptureMode::Live).unwrap(), CaptureType::Sample);
        session.stop();
        assert!(logs_contain("Falling back to simulator"));
    }

    #[test]
    fn source_opens_without_the_session_lock() {
        let session = session();
        let result = session.start_opening(|this| {
            assert!(this.state.try_lock().is_some());
            assert_eq!(this.snapshot().phase, SessionPhase::Idle);
            this.open_source(CaptureMode::Simulated)
        });
        assert_eq!(result.unwrap(), CaptureType::Sample);
        assert_eq!(session.phase(), SessionPhase::Capturing);
        session.stop();
    }

    #[test]
    fn start_racing_an_open_is_rejected() {
        let session = session();
        let result = session.start_opening(|this| {
            this.start(CaptureMode::Simulated).unwrap();
            OpenedSource {
                source: Box::new(this.simulator()),
                fallback: Some("late".into()),
            }
        });
        assert!(matches!(result, Err(SessionError::AlreadyCapturing)));
        let events: Vec<_> = session.status_events().try_iter().collect();
        assert_eq!(events, vec![StatusEvent::CaptureStarted { real: false }]);
        session.stop();
    }

    #[test]
    fn idle_session_has_empty_snapshot() {
        let session = session();
        let snapshot = session.snapshot();
        assert!(snapshot.records.is_empty());
        assert!(snapshot.summary.is_empty());
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert_eq!(snapshot.capture_type, CaptureType::Sample);
        assert!(!session.stop());
    }

    #[test]
    fn sample_uses_injected_clock() {
        let session = session().with_clock(Arc::new(VirtualClock::from_secs(10_000)));
        session.load_sample().unwrap();
        let records = session.snapshot().records;
        assert_eq!(records.last().map(PacketRecord::timestamp), Some(10_000.0 - 18.0));
        assert_eq!(session.metrics().store_records.get(), 200);
    }

    #[test]
    fn dropping_a_capturing_session_joins_the_worker() {
        let session = session();
        session.start(CaptureMode::Simulated).unwrap();
        drop(session);
    }
}
