use rustc_hash::FxHashMap;

use crate::runtime::{Error, Result};

/// Releases items strictly in sequence-number order.
///
/// Items arriving ahead of `next_seq` are parked until every earlier number
/// has been released. Since indices are dense, the map never holds more
/// items than there are batches in flight.
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    pending: FxHashMap<u64, T>,
    next_seq: u64,
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReorderBuffer<T> {
    pub fn new() -> ReorderBuffer<T> {
        ReorderBuffer {
            pending: FxHashMap::default(),
            next_seq: 0,
        }
    }

    /// Park an item. Numbers already released, or already parked, violate
    /// the dense numbering and are rejected
    pub fn insert(&mut self, seq: u64, item: T) -> Result<()> {
        if seq < self.next_seq || self.pending.contains_key(&seq) {
            return Err(Error::sequence_violation(seq, self.next_seq));
        }
        self.pending.insert(seq, item);
        Ok(())
    }

    /// Take the next item in order, if it has arrived
    pub fn pop_ready(&mut self) -> Option<T> {
        let item = self.pending.remove(&self.next_seq)?;
        self.next_seq += 1;
        Some(item)
    }

    #[inline(always)]
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Lowest parked sequence number, if any
    pub fn lowest_pending(&self) -> Option<u64> {
        self.pending.keys().min().copied()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
