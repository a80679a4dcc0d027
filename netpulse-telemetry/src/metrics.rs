//! ## netpulse-telemetry::metrics
//! **Prometheus registry for capture sessions**
//!
//! ### Components:
//! - `netpulse_packets_captured_total`: records appended to the store
//! - `netpulse_packets_evicted_total`: records dropped by the retention cap
//! - `netpulse_capture_errors_total`: sources that ended with an error
//! - `netpulse_store_records`: current store length
//! - `netpulse_stats_compute_seconds`: summary computation time

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub packets_captured: IntCounter,
    pub packets_evicted: IntCounter,
    pub capture_errors: IntCounter,
    pub store_records: IntGauge,
    pub stats_compute: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let packets_captured = IntCounter::new(
            "netpulse_packets_captured_total",
            "Packet records appended to the session store",
        )?;
        let packets_evicted = IntCounter::new(
            "netpulse_packets_evicted_total",
            "Packet records dropped by the retention cap",
        )?;
        let capture_errors = IntCounter::new(
            "netpulse_capture_errors_total",
            "Capture sources that stopped with an error",
        )?;
        let store_records =
            IntGauge::new("netpulse_store_records", "Records currently held by the store")?;
        let stats_compute = Histogram::with_opts(
            HistogramOpts::new(
                "netpulse_stats_compute_seconds",
                "Traffic summary computation time",
            )
            .buckets(vec![0.0001, 0.001, 0.01, 0.1, 1.0]),
        )?;

        registry.register(Box::new(packets_captured.clone()))?;
        registry.register(Box::new(packets_evicted.clone()))?;
        registry.register(Box::new(capture_errors.clone()))?;
        registry.register(Box::new(store_records.clone()))?;
        registry.register(Box::new(stats_compute.clone()))?;

        Ok(Self {
            registry,
            packets_captured,
            packets_evicted,
            capture_errors,
            store_records,
            stats_compute,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    #[inline]
    pub fn record_packet(&self, evicted: bool) {
        self.packets_captured.inc();
        if evicted {
            self.packets_evicted.inc();
        }
    }

    pub fn record_capture_error(&self) {
        self.capture_errors.inc();
    }

    pub fn set_store_records(&self, len: usize) {
        self.store_records.set(i64::try_from(len).unwrap_or(i64::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposition_lists_every_metric() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.record_packet(false);
        metrics.record_packet(true);
        metrics.record_capture_error();
        metrics.set_store_records(41);
        metrics.stats_compute.observe(0.002);

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("netpulse_packets_captured_total 2"));
        assert!(text.contains("netpulse_packets_evicted_total 1"));
        assert!(text.contains("netpulse_capture_errors_total 1"));
        assert!(text.contains("netpulse_store_records 41"));
        assert!(text.contains("netpulse_stats_compute_seconds_count 1"));
    }

    #[test]
    fn recorders_have_private_registries() {
        let a = MetricsRecorder::new().unwrap();
        let b = MetricsRecorder::new().unwrap();
        a.record_packet(false);
        assert_eq!(b.packets_captured.get(), 0);
    }
}
