//! Pair frequency table for BPE training.
//!
//! Counts how often every ordered pair of symbols appears next to each other
//! in the current sequence. Counts are adjusted one occurrence at a time while
//! the sequence is rewritten, so the table never has to be rebuilt from
//! scratch between merges.

use ahash::AHashMap;
use bpegram_core::{GrammarError, MergeCandidate, Pair, PairPriorityQueue, Result, Symbol};

/// Stale queue entries allowed per live pair before the queue is rebuilt.
const STALE_FACTOR: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PairEntry {
    count: u64,
    /// Insertion order, used to break ties between equal counts.
    stamp: u64,
}

/// Incrementally maintained counts of adjacent symbol pairs.
///
/// Only pairs with a positive count are stored. When several pairs share the
/// highest count, the one that entered the table first wins; a pair whose
/// count fell to zero and later reappears counts as a new entry.
pub struct PairFrequencyTable {
    /// Pair -> count and insertion stamp
    entries: AHashMap<Pair, PairEntry>,
    /// Lazy max-queue over `entries`
    queue: PairPriorityQueue,
    /// Stamp handed to the next inserted pair
    next_stamp: u64,
}

impl PairFrequencyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
            queue: PairPriorityQueue::new(),
            next_stamp: 0,
        }
    }

    /// Count every adjacent pair of `sequence` in one scan.
    ///
    /// Pairs are stamped in order of their first occurrence.
    pub fn from_sequence(sequence: &[Symbol]) -> Self {
        let mut table = Self {
            entries: AHashMap::with_capacity(sequence.len()),
            queue: PairPriorityQueue::with_capacity(sequence.len()),
            next_stamp: 0,
        };

        for window in sequence.windows(2) {
            let pair = (window[0], window[1]);
            let next_stamp = &mut table.next_stamp;
            let entry = table.entries.entry(pair).or_insert_with(|| {
                let stamp = *next_stamp;
                *next_stamp += 1;
                PairEntry { count: 0, stamp }
            });
            entry.count += 1;
        }

        table.rebuild_queue();
        table
    }

    /// Record one more occurrence of `pair`.
    pub fn increment(&mut self, pair: Pair) {
        let next_stamp = &mut self.next_stamp;
        let entry = self.entries.entry(pair).or_insert_with(|| {
            let stamp = *next_stamp;
            *next_stamp += 1;
            PairEntry { count: 0, stamp }
        });
        entry.count += 1;
        self.queue.push(MergeCandidate::new(pair, entry.count, entry.stamp));
    }

    /// Record that one occurrence of `pair` disappeared.
    ///
    /// The entry is removed once its count reaches zero. Decrementing a pair
    /// the table does not hold means the bookkeeping is broken.
    pub fn decrement(&mut self, pair: Pair) -> Result<()> {
        let entry = self.entries.get_mut(&pair).ok_or_else(|| {
            GrammarError::CorruptState(format!(
                "cannot decrement pair ({}, {}): not in frequency table",
                pair.0, pair.1
            ))
        })?;

        debug_assert!(entry.count > 0);
        entry.count -= 1;
        if entry.count == 0 {
            self.entries.remove(&pair);
        } else {
            self.queue.push(MergeCandidate::new(pair, entry.count, entry.stamp));
        }

        Ok(())
    }

    /// Return the pair with the highest count, or `None` when that count is
    /// below `min_frequency`.
    pub fn most_frequent(&mut self, min_frequency: u64) -> Option<(Pair, u64)> {
        let entries = &self.entries;
        let top = self.queue.peek_live(|candidate| {
            entries.get(&candidate.pair).map_or(false, |entry| {
                entry.count == candidate.count && entry.stamp == candidate.stamp
            })
        })?;

        if top.count < min_frequency {
            return None;
        }
        Some((top.pair, top.count))
    }

    /// Drop stale queue entries once they dominate the queue.
    pub fn compact(&mut self) {
        if self.queue.len() > STALE_FACTOR * self.entries.len() + 1024 {
            self.rebuild_queue();
        }
    }

    fn rebuild_queue(&mut self) {
        let candidates = self
            .entries
            .iter()
            .map(|(&pair, entry)| MergeCandidate::new(pair, entry.count, entry.stamp));
        self.queue.rebuild(candidates);
    }

    /// Current count of `pair` (zero when absent).
    #[inline]
    pub fn count(&self, pair: Pair) -> u64 {
        self.entries.get(&pair).map_or(0, |entry| entry.count)
    }

    /// Number of distinct pairs with a positive count.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no pair is counted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate pairs with their counts, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, u64)> + '_ {
        self.entries.iter().map(|(&pair, entry)| (pair, entry.count))
    }

    /// Compare every count against a fresh scan of `sequence`.
    pub fn verify(&self, sequence: &[Symbol]) -> Result<()> {
        let mut expected: AHashMap<Pair, u64> = AHashMap::with_capacity(self.entries.len());
        for window in sequence.windows(2) {
            *expected.entry((window[0], window[1])).or_insert(0) += 1;
        }

        if expected.len() != self.entries.len() {
            return Err(GrammarError::CorruptState(format!(
                "frequency table holds {} pairs, sequence has {}",
                self.entries.len(),
                expected.len()
            )));
        }
        for (pair, count) in expected {
            let stored = self.count(pair);
            if stored != count {
                return Err(GrammarError::CorruptState(format!(
                    "pair ({}, {}) counted {} times, sequence has {}",
                    pair.0, pair.1, stored, count
                )));
            }
        }

        Ok(())
    }
}

impl Default for PairFrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sequence() {
        let table = PairFrequencyTable::from_sequence(&[97, 98, 97, 98, 99]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.count((97, 98)), 2);
        assert_eq!(table.count((98, 97)), 1);
        assert_eq!(table.count((98, 99)), 1);
        assert_eq!(table.count((99, 97)), 0);
    }

    #[test]
    fn test_short_sequences_have_no_pairs() {
        assert!(PairFrequencyTable::from_sequence(&[]).is_empty());
        assert!(PairFrequencyTable::from_sequence(&[42]).is_empty());
    }

    #[test]
    fn test_decrement_to_zero_removes_entry() {
        let mut table = PairFrequencyTable::from_sequence(&[1, 2]);

        table.decrement((1, 2)).unwrap();

        assert!(table.is_empty());
        assert_eq!(table.count((1, 2)), 0);
    }

    #[test]
    fn test_decrement_missing_pair_is_corrupt_state() {
        let mut table = PairFrequencyTable::from_sequence(&[1, 2]);

        assert!(matches!(
            table.decrement((2, 1)),
            Err(GrammarError::CorruptState(_))
        ));
    }

    #[test]
    fn test_most_frequent_threshold() {
        let mut table = PairFrequencyTable::from_sequence(&[1, 2, 3, 4]);
        assert_eq!(table.most_frequent(2), None);

        let mut table = PairFrequencyTable::from_sequence(&[1, 2, 1, 2]);
        assert_eq!(table.most_frequent(2), Some(((1, 2), 2)));
    }

    #[test]
    fn test_tie_break_prefers_first_inserted() {
        // (5, 6) and (7, 8) both occur twice; (5, 6) is seen first
        let mut table = PairFrequencyTable::from_sequence(&[7, 5, 6, 0, 7, 8, 5, 6, 7, 8]);
        assert_eq!(table.count((5, 6)), 2);
        assert_eq!(table.count((7, 8)), 2);
        // (7, 5) was inserted before both but only occurs once
        assert_eq!(table.most_frequent(2), Some(((5, 6), 2)));
    }

    #[test]
    fn test_reinserted_pair_loses_its_place() {
        let mut table = PairFrequencyTable::new();
        table.increment((1, 1));
        table.increment((1, 1));
        table.increment((2, 2));
        table.increment((2, 2));
        assert_eq!(table.most_frequent(2), Some(((1, 1), 2)));

        table.decrement((1, 1)).unwrap();
        table.decrement((1, 1)).unwrap();
        table.increment((1, 1));
        table.increment((1, 1));

        assert_eq!(table.most_frequent(2), Some(((2, 2), 2)));
    }

    #[test]
    fn test_most_frequent_follows_updates() {
        let mut table = PairFrequencyTable::from_sequence(&[1, 2, 1, 2, 3, 4]);
        assert_eq!(table.most_frequent(2), Some(((1, 2), 2)));

        table.decrement((1, 2)).unwrap();
        table.increment((3, 4));
        table.increment((3, 4));

        assert_eq!(table.most_frequent(2), Some(((3, 4), 3)));
    }

    #[test]
    fn test_compact_keeps_answers() {
        let mut table = PairFrequencyTable::new();
        for _ in 0..2_000 {
            table.increment((9, 9));
        }
        for _ in 0..1_990 {
            table.decrement((9, 9)).unwrap();
        }
        table.increment((1, 1));

        table.compact();

        assert_eq!(table.most_frequent(2), Some(((9, 9), 10)));
        assert_eq!(table.count((1, 1)), 1);
    }

    #[test]
    fn test_verify() {
        let sequence = [3, 3, 3, 4];
        let mut table = PairFrequencyTable::from_sequence(&sequence);
        assert!(table.verify(&sequence).is_ok());

        table.increment((3, 4));
        assert!(matches!(
            table.verify(&sequence),
            Err(GrammarError::CorruptState(_))
        ));
    }
}
