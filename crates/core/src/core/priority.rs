//! Priority queue for pair frequency lookups.
//!
//! The queue is lazy: updating a pair pushes a fresh candidate and leaves the
//! old one behind. Callers decide which candidates are still live when they
//! peek, so the owner of the real counts stays the single source of truth.

use crate::core::grammar::Pair;
use dary_heap::OctonaryHeap;

/// A candidate pair for the next merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of symbols to merge
    pub pair: Pair,
    /// The frequency of this pair when the candidate was pushed
    pub count: u64,
    /// When the pair entered the frequency table (lower = earlier)
    pub stamp: u64,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, count: u64, stamp: u64) -> Self {
        Self { pair, count, stamp }
    }
}

// Higher count wins; among equal counts the earlier stamp wins.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.stamp.cmp(&self.stamp))
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Max-queue of merge candidates.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
pub struct PairPriorityQueue {
    heap: OctonaryHeap<MergeCandidate>,
}

impl PairPriorityQueue {
    /// Create a new priority queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
        }
    }

    /// Create a new empty priority queue.
    pub fn new() -> Self {
        Self {
            heap: OctonaryHeap::new(),
        }
    }

    /// Push a merge candidate onto the queue.
    pub fn push(&mut self, candidate: MergeCandidate) {
        self.heap.push(candidate);
    }

    /// Peek at the best candidate that `is_live` accepts.
    ///
    /// Rejected candidates found on top of the heap are discarded for good.
    pub fn peek_live<F>(&mut self, mut is_live: F) -> Option<MergeCandidate>
    where
        F: FnMut(&MergeCandidate) -> bool,
    {
        loop {
            let top = *self.heap.peek()?;
            if is_live(&top) {
                return Some(top);
            }
            self.heap.pop();
        }
    }

    /// Replace the queue contents with exactly `candidates`.
    ///
    /// Used to drop stale entries once they outnumber the live ones.
    pub fn rebuild(&mut self, candidates: impl IntoIterator<Item = MergeCandidate>) {
        self.heap.clear();
        self.heap.extend(candidates);
    }

    /// Get the number of (potentially stale) entries in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Clear all entries from the queue.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl Default for PairPriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}
