use std::collections::BTreeMap;

use serde::Serialize;

use netpulse_core::PacketRecord;

/// Traffic that fell into one fixed-width time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    /// Window start, whole seconds since the Unix epoch.
    pub start: i64,
    pub packets: usize,
    pub bytes: u64,
}

/// Groups `records` into `bucket_secs`-wide windows aligned to multiples of
/// the width, sorted by start. A width of zero is treated as one second.
pub fn timeline(records: &[PacketRecord], bucket_secs: u64) -> Vec<TimeBucket> {
    let width = bucket_secs.max(1) as f64;
    let mut buckets: BTreeMap<i64, TimeBucket> = BTreeMap::new();

    for record in records {
        let start = ((record.timestamp() / width).floor() * width) as i64;
        let bucket = buckets.entry(start).or_insert(TimeBucket {
            start,
            packets: 0,
            bytes: 0,
        });
        bucket.packets += 1;
        bucket.bytes += u64::from(record.size());
    }

    buckets.into_values().collect()
}
