//! One-shot sample data.

use tracing::debug;

use netpulse_core::PacketRecord;

use crate::anomaly;
use crate::clock::Clock;
use crate::generator::TrafficGenerator;
use crate::options::SampleOptions;
use crate::profile::TrafficProfile;

/// Builds a sample batch ending at `clock`'s current time.
///
/// Record `i` is stamped `now - size * spacing + i * spacing`, so the batch
/// covers the recent past in ascending order. Exactly `anomalies` distinct
/// records (capped at `size`) are oversized afterwards.
pub fn generate_sample_batch(options: &SampleOptions, clock: &dyn Clock) -> Vec<PacketRecord> {
    let mut generator = TrafficGenerator::new(TrafficProfile::SAMPLE, options.seed);
    let base = clock.now_secs() - options.size as f64 * options.spacing_secs;

    let mut records: Vec<PacketRecord> = (0..options.size)
        .map(|i| generator.next_record(base + i as f64 * options.spacing_secs))
        .collect();
    let injected = anomaly::inject_distinct(&mut records, options.anomalies, generator.rng());

    debug!(records = records.len(), anomalies = injected, "Generated sample batch");
    records
}
