//! Configuration Module
//!
//! Handles loading and managing configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::{CLEANUP_INTERVAL_SECS, DEFAULT_MAX_SIZE, DEFAULT_TTL_MS};

/// Configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Default TTL in milliseconds for entries stored without one
    pub default_ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Base URL prefixed to every proxied endpoint
    pub api_base_url: String,
    /// Upstream request timeout in seconds
    pub request_timeout_secs: u64,
    /// Directory for file-backed session storage; in-memory when unset
    pub cache_session_dir: Option<PathBuf>,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 100)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 1800000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 300)
    /// - `API_BASE_URL` - Upstream base URL (default: http://localhost:8080)
    /// - `REQUEST_TIMEOUT_SECS` - Upstream timeout (default: 30)
    /// - `CACHE_SESSION_DIR` - Session storage directory (default: in-memory)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl_ms: env_or("DEFAULT_TTL_MS", defaults.default_ttl_ms),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            api_base_url: env::var("API_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.api_base_url),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            cache_session_dir: env::var_os("CACHE_SESSION_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_SIZE,
            default_ttl_ms: DEFAULT_TTL_MS,
            server_port: 3000,
            cleanup_interval: CLEANUP_INTERVAL_SECS,
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            cache_session_dir: None,
        }
    }
}
