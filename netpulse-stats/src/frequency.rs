use std::collections::HashMap;
use std::hash::Hash;

/// Occurrence counts that remember the order keys were first seen in.
///
/// Ranking is by descending count; equal counts keep first-seen order, so the
/// same input always ranks the same way.
#[derive(Debug, Clone)]
pub struct FrequencyTable<K> {
    slots: HashMap<K, usize>,
    counts: Vec<(K, usize)>,
}

impl<K: Eq + Hash + Clone> FrequencyTable<K> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            counts: Vec::new(),
        }
    }

    pub fn add(&mut self, key: K) {
        match self.slots.get(&key) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.slots.insert(key.clone(), self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Every key with its count, highest first.
    pub fn ranked(self) -> Vec<(K, usize)> {
        let mut counts = self.counts;
        // Stable: ties stay in first-seen order.
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    pub fn top(self, n: usize) -> Vec<(K, usize)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

impl<K: Eq + Hash + Clone> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for FrequencyTable<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut table = Self::new();
        for key in iter {
            table.add(key);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_first_seen_order() {
        let table: FrequencyTable<&str> = ["b", "a", "c", "a", "b", "d"].into_iter().collect();
        assert_eq!(table.total(), 6);
        assert_eq!(table.distinct(), 4);
        assert_eq!(
            table.ranked(),
            vec![("b", 2), ("a", 2), ("c", 1), ("d", 1)]
        );
    }

    #[test]
    fn top_truncates() {
        let table: FrequencyTable<u16> = [1, 2, 3, 3, 4, 5, 6, 6, 6].into_iter().collect();
        assert_eq!(table.top(3), vec![(6, 3), (3, 2), (1, 1)]);
    }

    #[test]
    fn empty_table() {
        let table: FrequencyTable<u16> = FrequencyTable::new();
        assert_eq!(table.total(), 0);
        assert!(table.ranked().is_empty());
    }
}
