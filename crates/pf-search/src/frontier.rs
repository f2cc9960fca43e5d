//! Search frontier: a min-heap on tentative distance.
//!
//! Entries with equal distance pop in insertion order (FIFO).  Each push
//! stamps the entry with a monotonically increasing sequence number that
//! acts as the secondary key, so the order is fully deterministic.
//!
//! The heap does not support decrease-key.  A node whose distance improves
//! is pushed again and the older entry becomes stale; the engine discards
//! stale entries when they surface (their node is already visited).

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use pf_core::NodeId;

#[derive(Copy, Clone, Debug)]
struct Entry {
    cost: f64,
    seq:  u64,
    node: NodeId,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-priority queue of `(cost, node)` pairs with FIFO tie-breaking.
#[derive(Debug, Default)]
pub struct Frontier {
    // Reverse makes BinaryHeap (max) behave as min-heap.
    heap:     BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeId, cost: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { cost, seq, node }));
    }

    /// Remove and return the cheapest entry (oldest first on ties).
    pub fn pop(&mut self) -> Option<(NodeId, f64)> {
        self.heap.pop().map(|Reverse(e)| (e.node, e.cost))
    }

    /// Number of heap entries, stale ones included.
    pub fn raw_len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every entry and restart the sequence counter.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }
}
