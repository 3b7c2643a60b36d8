use std::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Positions stored under one key plus how many were handed out already.
#[derive(Debug, Default)]
struct Bucket {
    positions: SmallVec<[usize; 1]>,
    next: usize,
}

/// Multi-valued index from a match key to residual positions.
///
/// Positions under one key are kept in insertion order and handed out
/// front first. Records sharing a key are indistinguishable for the stage
/// that built the index, so which one is taken carries no meaning beyond
/// keeping runs reproducible.
#[derive(Debug)]
pub struct MultiIndex<K> {
    slots: HashMap<K, Bucket>,
}

impl<K: Eq + Hash> MultiIndex<K> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, key: K, pos: usize) {
        self.slots.entry(key).or_default().positions.push(pos);
    }

    /// Remove and return the earliest position stored under `key`.
    pub fn take(&mut self, key: &K) -> Option<usize> {
        let bucket = self.slots.get_mut(key)?;
        let pos = bucket.positions.get(bucket.next).copied();
        bucket.next += 1;
        if bucket.next >= bucket.positions.len() {
            self.slots.remove(key);
        }
        pos
    }

    /// Number of distinct keys still holding positions.
    pub fn key_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
#[path = "multi_index_tests.rs"]
mod tests;
