//! Cache Store Module
//!
//! Main cache engine: HashMap storage with TTL expiration, oldest-first
//! eviction and a session snapshot written after every mutation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, MemoryStorage, SessionStorage, StorageError};
use crate::cache::{DEFAULT_MAX_SIZE, DEFAULT_TTL_MS, STORAGE_KEY};

/// An entry plus its insertion sequence, which breaks eviction ties.
#[derive(Debug)]
struct Slot {
    seq: u64,
    entry: CacheEntry,
}

// == Cache Store ==
/// TTL cache for API response bodies.
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, Slot>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
    /// TTL in milliseconds used by `set` when none is given
    default_ttl_ms: u64,
    /// Session medium the snapshot is written to
    storage: Arc<dyn SessionStorage>,
    next_seq: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a CacheStore backed by a fresh in-memory session storage.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries the cache can hold
    /// * `default_ttl_ms` - TTL in milliseconds for `set` calls without one
    pub fn new(max_size: usize, default_ttl_ms: u64) -> Self {
        Self::with_storage(max_size, default_ttl_ms, Arc::new(MemoryStorage::new()))
    }

    /// Creates a CacheStore and restores whatever live entries the given
    /// storage holds from earlier in the session.
    pub fn with_storage(
        max_size: usize,
        default_ttl_ms: u64,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        let mut store = Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_size: max_size.max(1),
            default_ttl_ms,
            storage,
            next_seq: 0,
        };
        store.load();
        store
    }

    // == Get ==
    /// Retrieves a cached payload.
    ///
    /// Expired entries are removed on discovery and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let Some(slot) = self.entries.get(key) else {
            self.stats.record_miss();
            debug!(key, "Cache miss");
            return None;
        };

        if slot.entry.is_expired_at(current_timestamp_ms()) {
            self.entries.remove(key);
            self.persist();
            self.stats.record_miss();
            debug!(key, "Cache miss (expired)");
            return None;
        }

        let data = slot.entry.data.clone();
        self.stats.record_hit();
        debug!(key, "Cache hit");
        Some(data)
    }

    // == Set ==
    /// Stores a payload, replacing any previous entry for the key.
    ///
    /// When a new key would push the store past `max_size`, the entry with the
    /// oldest timestamp is evicted first.
    ///
    /// # Arguments
    /// * `key` - The cache key
    /// * `data` - The payload to store
    /// * `ttl_ms` - Optional TTL in milliseconds (uses the default if None)
    pub fn set(&mut self, key: impl Into<String>, data: Value, ttl_ms: Option<u64>) {
        let key = key.into();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            self.evict_oldest();
        }

        let entry = CacheEntry::new(key.clone(), data, ttl_ms.unwrap_or(self.default_ttl_ms));
        let seq = self.bump_seq();
        self.entries.insert(key, Slot { seq, entry });

        self.persist();
    }

    // == Has ==
    /// Returns whether a live entry exists for the key.
    ///
    /// Removes the entry if it turns out to be expired. Does not touch the
    /// hit/miss counters.
    pub fn has(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            None => return false,
            Some(slot) => slot.entry.is_expired_at(current_timestamp_ms()),
        };

        if expired {
            self.entries.remove(key);
            self.persist();
        }
        !expired
    }

    // == Invalidate ==
    /// Removes every entry (`None`) or every entry whose key contains the
    /// pattern. Returns how many entries were removed.
    pub fn invalidate(&mut self, pattern: Option<&str>) -> usize {
        let before = self.entries.len();

        match pattern {
            None => self.entries.clear(),
            Some(pattern) => self.entries.retain(|key, _| !key.contains(pattern)),
        }

        let removed = before - self.entries.len();
        self.persist();
        debug!(?pattern, removed, "Cache invalidated");
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    /// Zeroes the hit and miss counters.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn clean_expired(&mut self) -> usize {
        let removed = self.remove_expired();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    // == Length ==
    /// Returns the current number of entries in the cache, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity bound enforced before every insert.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, slot)| (slot.entry.timestamp, slot.seq))
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.stats.record_eviction();
            debug!(key = %key, "Evicted oldest cache entry");
        }
    }

    fn remove_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let before = self.entries.len();
        self.entries.retain(|_, slot| !slot.entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Persistence ==
    /// Best-effort snapshot write. On failure expired entries are purged and
    /// the write is retried once; a second failure leaves the cache valid in
    /// memory only.
    fn persist(&mut self) {
        let Err(err) = self.write_snapshot() else {
            return;
        };
        warn!(error = %err, "Cache persistence failed, purging expired entries and retrying");

        let purged = self.remove_expired();
        if let Err(err) = self.write_snapshot() {
            warn!(
                error = %err,
                purged,
                "Cache persistence retry failed, cache is kept in memory only"
            );
        }
    }

    fn write_snapshot(&self) -> Result<(), StorageError> {
        let mut slots: Vec<&Slot> = self.entries.values().collect();
        slots.sort_by_key(|slot| slot.seq);
        let snapshot: Vec<&CacheEntry> = slots.into_iter().map(|slot| &slot.entry).collect();

        let raw = serde_json::to_string(&snapshot)?;
        self.storage.set_item(STORAGE_KEY, &raw)
    }

    fn load(&mut self) {
        let raw = match self.storage.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                warn!(error = %err, "Discarding unreadable persisted cache");
                self.discard_snapshot();
                return;
            }
        };

        let stored: Vec<CacheEntry> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "Discarding corrupt persisted cache");
                self.discard_snapshot();
                return;
            }
        };

        let total = stored.len();
        let now = current_timestamp_ms();
        let mut live: Vec<CacheEntry> = stored
            .into_iter()
            .filter(|entry| entry.expires_at > now && entry.expires_at > entry.timestamp)
            .collect();

        if live.len() > self.max_size {
            live.sort_by_key(|entry| entry.timestamp);
            live.drain(..live.len() - self.max_size);
        }

        for entry in live {
            let seq = self.bump_seq();
            self.entries.insert(entry.key.clone(), Slot { seq, entry });
        }

        let dropped = total - self.entries.len();
        if dropped > 0 {
            self.persist();
        }

        info!(
            entries = self.entries.len(),
            dropped, "Restored cache from session storage"
        );
    }

    fn discard_snapshot(&self) {
        if let Err(err) = self.storage.remove_item(STORAGE_KEY) {
            warn!(error = %err, "Could not clear persisted cache");
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE, DEFAULT_TTL_MS)
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.entries.len())
            .field("max_size", &self.max_size)
            .field("default_ttl_ms", &self.default_ttl_ms)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
