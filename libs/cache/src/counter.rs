//! Per-node occurrence counters.
//!
//! The cache keeps two of these, with different semantics attached by the
//! caller: how many times a node was discarded as a placement candidate
//! ("maybe over-reserved"), and how many times a foreign pod was observed on
//! it. Not thread-safe on its own; both instances live under the cache lock.

use std::collections::BTreeMap;

/// Monotonic per-node counter with delete and enumeration.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    counts: BTreeMap<String, u64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for a node, returning the new value.
    pub fn incr(&mut self, node: &str) -> u64 {
        let count = self.counts.entry(node.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Drop the count for a node, if any.
    pub fn delete(&mut self, node: &str) {
        self.counts.remove(node);
    }

    /// Whether the node has a count recorded.
    pub fn is_set(&self, node: &str) -> bool {
        self.counts.contains_key(node)
    }

    /// All node names with a recorded count.
    pub fn keys(&self) -> Vec<String> {
        self.counts.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
