//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted to respect the capacity bound
    pub evictions: u64,
    /// Current number of entries in the cache
    pub size: usize,
    /// Hit rate as a percentage in `0.0..=100.0`
    pub hit_rate: f64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate as a percentage.
    ///
    /// Returns hits / (hits + misses) * 100, or 0.0 if no lookups have been made.
    pub fn compute_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Reset ==
    /// Zeroes hits and misses. Evictions and size are left alone.
    pub fn reset(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    // == Snapshot ==
    /// Returns a copy with `size` and `hit_rate` filled in.
    pub fn snapshot(&self, size: usize) -> Self {
        Self {
            size,
            hit_rate: self.compute_hit_rate(),
            ..self.clone()
        }
    }
}
