//! Bounded memo tables with insertion-order eviction.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::ops::Add;

use lru::LruCache;
use serde::Serialize;

/// Hit, miss and eviction counters of a memo table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the table, 0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

impl Add for CacheStats {
    type Output = CacheStats;

    fn add(self, other: CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
            evictions: self.evictions + other.evictions,
        }
    }
}

/// A bounded cache that evicts the oldest *inserted* entry.
///
/// Lookups never refresh an entry, so eviction order is strict FIFO no
/// matter how often an entry is read.
#[derive(Debug)]
pub struct MemoTable<K: Hash + Eq, V> {
    entries: LruCache<K, V>,
    stats: CacheStats,
}

impl<K: Hash + Eq, V: Clone> MemoTable<K, V> {
    /// Creates an empty table. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Looks up a value, counting the hit or miss.
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.entries.peek(key) {
            Some(value) => {
                self.stats.hits += 1;
                Some(value.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Inserts a value, returning the key evicted to make room, if any.
    ///
    /// Re-inserting an existing key replaces its value and counts as the
    /// newest insertion.
    pub fn insert(&mut self, key: K, value: V) -> Option<K> {
        let replacing = self.entries.contains(&key);
        match self.entries.push(key, value) {
            Some((evicted, _)) if !replacing => {
                self.stats.evictions += 1;
                Some(evicted)
            }
            _ => None,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Drops every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
