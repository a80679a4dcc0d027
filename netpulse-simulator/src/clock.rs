//! # Simulation clocks
//!
//! Where simulated records get their timestamps from. The session uses
//! [`SystemClock`]; [`VirtualClock`] gives reproducible timestamps.
//!
//! ## Expectations:
//! - Seconds since the Unix epoch, fractional
//! - `VirtualClock` only moves when advanced and is shareable across threads

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub trait Clock: Send + Sync {
    /// Current time, seconds since the Unix epoch.
    fn now_secs(&self) -> f64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// A manually advanced clock with nanosecond resolution.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    now_ns: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Creates a clock reading `start_ns` nanoseconds past the epoch.
    pub fn new(start_ns: u64) -> Self {
        Self {
            now_ns: Arc::new(AtomicU64::new(start_ns)),
        }
    }

    pub fn from_secs(start: u64) -> Self {
        Self::new(start.saturating_mul(1_000_000_000))
    }

    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.now_ns.load(Ordering::Acquire)
    }

    #[inline]
    pub fn advance(&self, by: Duration) {
        self.now_ns
            .fetch_add(by.as_nanos() as u64, Ordering::Release);
    }
}

impl Clock for VirtualClock {
    fn now_secs(&self) -> f64 {
        self.now_ns() as f64 / 1e9
    }
}
