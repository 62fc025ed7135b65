//! Cache Module
//!
//! In-memory API response cache with TTL expiration, capacity eviction and
//! session persistence, plus the key and TTL derivation rules.

mod entry;
mod key;
mod stats;
mod storage;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::{generate_cache_key, get_cache_ttl, DEFAULT_ENDPOINT_TTL_MS, TTL_RULES};
pub use stats::CacheStats;
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use store::CacheStore;

// == Public Constants ==
/// Default capacity of the store
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Default TTL for `CacheStore::set`, 30 minutes
pub const DEFAULT_TTL_MS: u64 = 30 * 60 * 1000;

/// Session storage key holding the persisted snapshot
pub const STORAGE_KEY: &str = "raas_api_cache";

/// Interval of the background expiry sweep, 5 minutes
pub const CLEANUP_INTERVAL_SECS: u64 = 5 * 60;
