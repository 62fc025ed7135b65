//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries, so that
//! entries nobody reads again are still dropped from memory and from the
//! session snapshot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between cleanup runs. It acquires a write lock on the cache store to
/// remove expired entries.
///
/// # Arguments
/// * `cache` - Arc<RwLock<CacheStore>> shared reference to the cache
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheStore::default()));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 300);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<CacheStore>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    spawn_cleanup_task_every(cache, Duration::from_secs(cleanup_interval_secs))
}

/// Same as [`spawn_cleanup_task`] with an arbitrary interval.
pub fn spawn_cleanup_task_every(cache: Arc<RwLock<CacheStore>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting TTL cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.clean_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStorage, SessionStorage, STORAGE_KEY};
    use serde_json::json;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = Arc::new(RwLock::new(CacheStore::default()));

        cache.write().await.set("expire_soon", json!("value"), Some(20));

        let handle = spawn_cleanup_task_every(cache.clone(), Duration::from_millis(50));

        // Wait for entry to expire and cleanup to run
        tokio::time::sleep(Duration::from_millis(200)).await;

        // The sweep removed it without anyone reading it
        assert!(cache.read().await.is_empty());
        assert_eq!(cache.read().await.stats().misses, 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_rewrites_session_snapshot() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CacheStore::with_storage(10, 60_000, storage.clone());
        let cache = Arc::new(RwLock::new(store));

        cache.write().await.set("GET:/rates?receiving_country_code=PK", json!([1]), Some(20));
        cache.write().await.set("GET:/codes?code_type=BANK", json!([2]), None);

        let handle = spawn_cleanup_task_every(cache.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();

        let raw = storage.get_item(STORAGE_KEY).unwrap().unwrap();
        assert!(!raw.contains("/rates"));
        assert!(raw.contains("/codes"));
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = Arc::new(RwLock::new(CacheStore::default()));

        cache.write().await.set("long_lived", json!("value"), Some(3_600_000));

        let handle = spawn_cleanup_task_every(cache.clone(), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.write().await.get("long_lived"), Some(json!("value")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = Arc::new(RwLock::new(CacheStore::default()));

        let handle = spawn_cleanup_task(cache, 300);

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
