//! netpulse‑capture
//!
//! Provides the producer side of a capture session: the [`PacketSource`]
//! contract every source implements, and the pcap-backed [`LiveCapture`].
//! The simulated source lives in `netpulse-simulator`.

pub mod live_capture;
pub mod source;

pub use live_capture::{LiveCapture, LiveCaptureOptions};
pub use source::{PacketSource, SourceError};
