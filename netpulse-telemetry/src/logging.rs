//! ## netpulse-telemetry::logging
//! **Structured logging with tracing and OpenTelemetry attributes**
//!
//! ### Expectations:
//! - `RUST_LOG` wins over the configured default level
//! - Worker threads are identifiable by name in every line
//! - Session lifecycle events carry their attributes as structured fields

use std::error::Error;

use opentelemetry::KeyValue;
use tracing::info_span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global fmt subscriber. Fails if one is already set.
    pub fn init(default_level: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_thread_names(true)
            .with_span_events(FmtSpan::NONE)
            .try_init()
    }

    /// Logs a session lifecycle event inside a `session_event` span.
    #[inline]
    pub fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!(
            "session_event",
            event_type = event_type,
            otel.kind = "INTERNAL"
        );
        let _entered = span.enter();
        let attributes: Vec<String> = metadata
            .iter()
            .map(|kv| format!("{}={}", kv.key, kv.value))
            .collect();
        tracing::info!(
            attributes = %attributes.join(" "),
            "Session event: {event_type}"
        );
    }
}
