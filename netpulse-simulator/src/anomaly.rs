//! Anomaly injection.
//!
//! An anomaly is a record whose size exceeds any normal profile size. Sizes are
//! drawn from [`ANOMALY_SIZES`].

use std::ops::RangeInclusive;

use rand::seq::index;
use rand::Rng;

use netpulse_core::PacketRecord;

/// Byte lengths given to anomalous records.
pub const ANOMALY_SIZES: RangeInclusive<u32> = 2000..=5000;

/// Returns `record` with an oversized length.
pub fn oversize<R: Rng + ?Sized>(record: PacketRecord, rng: &mut R) -> PacketRecord {
    record.with_size(rng.random_range(ANOMALY_SIZES))
}

/// Oversizes `record` with probability `rate`.
pub fn maybe_oversize<R: Rng + ?Sized>(
    record: PacketRecord,
    rate: f64,
    rng: &mut R,
) -> PacketRecord {
    if rate > 0.0 && rng.random_bool(rate.min(1.0)) {
        oversize(record, rng)
    } else {
        record
    }
}

/// Oversizes exactly `count` distinct records (fewer if the batch is smaller).
/// Returns the number of records touched.
pub fn inject_distinct<R: Rng + ?Sized>(
    records: &mut [PacketRecord],
    count: usize,
    rng: &mut R,
) -> usize {
    let count = count.min(records.len());
    for i in index::sample(rng, records.len(), count) {
        records[i] = oversize(records[i], rng);
    }
    count
}
