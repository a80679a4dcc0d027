//! ## netpulse-core::store
//! **Session packet store**
//!
//! Append-only, ordered storage for the records of the current session.
//!
//! ### Expectations:
//! - One writer (the active source) and any number of readers
//! - `append` holds the lock for a push (and at most one eviction)
//! - Readers only ever get copies: a snapshot is taken under the lock, so a
//!   reader sees the store either before or after any append/clear
//! - Optional retention cap that drops the oldest record on overflow
//!
//! Incremental consumers keep a [`StoreCursor`] and call
//! [`PacketStore::read_since`] to receive only what was appended since their
//! last read.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::trace;

use crate::packet::PacketRecord;

/// Position in the store, as seen by an incremental reader.
///
/// The default cursor points at the start of the first session epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCursor {
    epoch: u64,
    next_seq: u64,
}

impl StoreCursor {
    /// Session epoch the cursor belongs to; bumped by every clear or replace.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Sequence number, within the epoch, of the next record to be read.
    /// Records are numbered from zero and keep their number when older
    /// records are evicted.
    pub fn sequence(&self) -> u64 {
        self.next_seq
    }
}

/// Result of an incremental read.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreDelta {
    /// The reader's view is stale (store cleared, replaced or evicted past the
    /// cursor); `records` then holds the whole current content.
    pub reset: bool,
    pub records: Vec<PacketRecord>,
    /// Cursor to pass to the next read.
    pub cursor: StoreCursor,
}

#[derive(Debug, Default)]
struct StoreInner {
    records: VecDeque<PacketRecord>,
    /// Bumped by `clear` and `replace`.
    epoch: u64,
    /// Sequence number of `records[0]` within the epoch.
    first_seq: u64,
    evicted: u64,
}

impl StoreInner {
    fn end_seq(&self) -> u64 {
        self.first_seq + self.records.len() as u64
    }

    fn cursor(&self) -> StoreCursor {
        StoreCursor {
            epoch: self.epoch,
            next_seq: self.end_seq(),
        }
    }

    fn push(&mut self, record: PacketRecord, max_records: Option<usize>) -> bool {
        self.records.push_back(record);
        match max_records {
            Some(max) if self.records.len() > max => {
                self.records.pop_front();
                self.first_seq += 1;
                self.evicted += 1;
                true
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        self.records.clear();
        self.epoch += 1;
        self.first_seq = 0;
    }
}

#[derive(Debug, Default)]
pub struct PacketStore {
    inner: Mutex<StoreInner>,
    max_records: Option<usize>,
}

impl PacketStore {
    /// Creates a store that keeps at most `max_records` records (`None` or `0`
    /// means unbounded).
    pub fn new(max_records: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            max_records: max_records.filter(|max| *max > 0),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn max_records(&self) -> Option<usize> {
        self.max_records
    }

    /// Appends one record. Returns `true` if the oldest record was evicted to
    /// stay within the retention cap.
    pub fn append(&self, record: PacketRecord) -> bool {
        self.inner.lock().push(record, self.max_records)
    }

    /// Appends records in order under a single lock. Returns the number of
    /// evicted records.
    pub fn extend<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = PacketRecord>,
    {
        let mut inner = self.inner.lock();
        let mut evicted = 0;
        for record in records {
            if inner.push(record, self.max_records) {
                evicted += 1;
            }
        }
        evicted
    }

    /// Atomically swaps the whole content for `records`.
    ///
    /// Readers observe either the old content or the new one. Returns the
    /// number of records that did not fit under the retention cap.
    pub fn replace<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = PacketRecord>,
    {
        let mut inner = self.inner.lock();
        inner.reset();
        let mut dropped = 0;
        for record in records {
            if inner.push(record, self.max_records) {
                dropped += 1;
            }
        }
        trace!(len = inner.records.len(), dropped, "store content replaced");
        dropped
    }

    /// Empties the store and starts a new epoch.
    pub fn clear(&self) {
        self.inner.lock().reset();
    }

    /// Point-in-time copy of every stored record, oldest first.
    pub fn snapshot(&self) -> Vec<PacketRecord> {
        self.inner.lock().records.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Total number of records dropped by the retention cap since creation.
    pub fn evicted(&self) -> u64 {
        self.inner.lock().evicted
    }

    /// Cursor positioned after the last stored record.
    pub fn cursor(&self) -> StoreCursor {
        self.inner.lock().cursor()
    }

    /// Returns the records appended after `cursor`.
    pub fn read_since(&self, cursor: StoreCursor) -> StoreDelta {
        let inner = self.inner.lock();
        let in_range = cursor.epoch == inner.epoch
            && cursor.next_seq >= inner.first_seq
            && cursor.next_seq <= inner.end_seq();

        let (reset, skip) = if in_range {
            (false, (cursor.next_seq - inner.first_seq) as usize)
        } else {
            (true, 0)
        };

        StoreDelta {
            reset,
            records: inner.records.iter().skip(skip).copied().collect(),
            cursor: inner.cursor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::TcpFlags;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    fn record(seq: u32) -> PacketRecord {
        PacketRecord::new(f64::from(seq), seq, None, None).tcp(1024, 80, Some(TcpFlags::ACK))
    }

    fn sizes(records: &[PacketRecord]) -> Vec<u32> {
        records.iter().map(PacketRecord::size).collect()
    }

    #[test]
    fn append_is_visible_to_another_thread() {
        let store = Arc::new(PacketStore::unbounded());
        let writer = store.clone();
        thread::spawn(move || writer.append(record(7)))
            .join()
            .unwrap();

        let snapshot = thread::spawn(move || store.snapshot()).join().unwrap();
        assert_eq!(sizes(&snapshot), vec![7]);
    }

    #[test]
    fn clear_empties_and_len_tracks() {
        let store = PacketStore::unbounded();
        store.extend((0..5).map(record));
        assert_eq!(store.len(), 5);
        store.clear();
        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn retention_cap_drops_oldest() {
        let store = PacketStore::new(Some(3));
        let evicted: Vec<bool> = (0..5).map(|i| store.append(record(i))).collect();
        assert_eq!(evicted, vec![false, false, false, true, true]);
        assert_eq!(sizes(&store.snapshot()), vec![2, 3, 4]);
        assert_eq!(store.evicted(), 2);
    }

    #[test]
    fn zero_cap_means_unbounded() {
        let store = PacketStore::new(Some(0));
        assert_eq!(store.max_records(), None);
        store.extend((0..10).map(record));
        assert_eq!(store.len(), 10);
    }

    #[test]
    fn cursor_reads_only_new_records() {
        let store = PacketStore::unbounded();
        let first = store.read_since(StoreCursor::default());
        assert!(!first.reset);
        assert!(first.records.is_empty());

        store.extend((0..3).map(record));
        let delta = store.read_since(first.cursor);
        assert!(!delta.reset);
        assert_eq!(sizes(&delta.records), vec![0, 1, 2]);

        store.append(record(3));
        let delta = store.read_since(delta.cursor);
        assert_eq!(sizes(&delta.records), vec![3]);

        let idle = store.read_since(delta.cursor);
        assert!(idle.records.is_empty());
        assert_eq!(idle.cursor, delta.cursor);
    }

    #[test]
    fn cursor_resets_after_clear_and_replace() {
        let store = PacketStore::unbounded();
        store.extend((0..3).map(record));
        let cursor = store.cursor();

        store.clear();
        store.append(record(9));
        let delta = store.read_since(cursor);
        assert!(delta.reset);
        assert_eq!(sizes(&delta.records), vec![9]);

        store.replace((20..22).map(record));
        let delta = store.read_since(delta.cursor);
        assert!(delta.reset);
        assert_eq!(sizes(&delta.records), vec![20, 21]);
    }

    #[test]
    fn cursor_resets_when_evicted_past() {
        let store = PacketStore::new(Some(2));
        store.append(record(0));
        let cursor = store.cursor();
        store.extend((1..5).map(record));

        let delta = store.read_since(cursor);
        assert!(delta.reset);
        assert_eq!(sizes(&delta.records), vec![3, 4]);
        assert_eq!(delta.cursor.epoch(), cursor.epoch());
        assert_eq!(delta.cursor.sequence(), 5);
    }

    #[test]
    fn cursor_sequence_restarts_with_each_epoch() {
        let store = PacketStore::unbounded();
        store.extend((0..3).map(record));
        let before = store.cursor();
        assert_eq!(before.sequence(), 3);

        store.clear();
        store.append(record(9));
        let after = store.cursor();
        assert_eq!(after.epoch(), before.epoch() + 1);
        assert_eq!(after.sequence(), 1);
    }

    #[test]
    fn replace_applies_retention_cap() {
        let store = PacketStore::new(Some(4));
        let dropped = store.replace((0..10).map(record));
        assert_eq!(dropped, 6);
        assert_eq!(sizes(&store.snapshot()), vec![6, 7, 8, 9]);
    }

    #[test]
    fn concurrent_clear_never_exposes_a_mixed_state() {
        let store = Arc::new(PacketStore::unbounded());
        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..5_000 {
                    store.append(record(i));
                }
            })
        };
        let clearer = {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    store.clear();
                    thread::yield_now();
                }
            })
        };

        for _ in 0..200 {
            let snapshot = store.snapshot();
            // Whatever survived a clear is a contiguous, ordered run of appends.
            let observed = sizes(&snapshot);
            assert!(observed.windows(2).all(|pair| pair[1] == pair[0] + 1));
        }

        writer.join().unwrap();
        clearer.join().unwrap();
    }

    proptest! {
        #[test]
        fn snapshot_matches_appends(count in 0u32..300, cap in proptest::option::of(1usize..64)) {
            let store = PacketStore::new(cap);
            for i in 0..count {
                store.append(record(i));
            }
            let expected: Vec<u32> = match cap {
                Some(cap) => (count.saturating_sub(cap as u32)..count).collect(),
                None => (0..count).collect(),
            };
            prop_assert_eq!(sizes(&store.snapshot()), expected);
            prop_assert_eq!(store.len(), store.snapshot().len());
        }
    }
}
