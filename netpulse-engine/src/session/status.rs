use std::fmt;

/// Notifications for the presentation layer, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    CaptureStarted { real: bool },
    CaptureStopped,
    /// The running source failed; a `CaptureStopped` follows.
    Error(String),
    /// Live capture could not be opened; the simulator runs instead.
    BackendUnavailable(String),
    SampleLoaded { count: usize },
    Cleared,
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::CaptureStarted { real: true } => f.write_str("Capturing real packets..."),
            StatusEvent::CaptureStarted { real: false } => {
                f.write_str("Capturing simulated packets...")
            }
            StatusEvent::CaptureStopped => f.write_str("Capture stopped"),
            StatusEvent::Error(message) => write!(f, "Error: {message}"),
            StatusEvent::BackendUnavailable(message) => {
                write!(f, "Live capture unavailable ({message}), using simulated packets")
            }
            StatusEvent::SampleLoaded { count } => write!(f, "Sample data loaded ({count} packets)"),
            StatusEvent::Cleared => f.write_str("Data cleared"),
        }
    }
}
