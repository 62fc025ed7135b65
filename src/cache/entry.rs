//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A cached API response body with its creation and expiry times.
///
/// Serialized with camelCase field names, which is the layout of the
/// persisted session snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T = Value> {
    /// Canonical cache key
    pub key: String,
    /// The stored payload
    pub data: T,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    ///
    /// A TTL of zero is clamped to one millisecond so that `expires_at`
    /// always lies strictly after `timestamp`.
    pub fn new(key: impl Into<String>, data: T, ttl_ms: u64) -> Self {
        Self::created_at(key, data, current_timestamp_ms(), ttl_ms)
    }

    /// Creates a new entry with an explicit creation time.
    pub fn created_at(key: impl Into<String>, data: T, timestamp: u64, ttl_ms: u64) -> Self {
        Self {
            key: key.into(),
            data,
            timestamp,
            expires_at: timestamp.saturating_add(ttl_ms.max(1)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// An entry is expired once `now` is strictly past `expires_at`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
