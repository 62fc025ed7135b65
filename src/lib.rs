//! Remit Cache - caching API client for the remittance developer portal
//!
//! Serves repeated master-data GETs from a session-scoped TTL cache, checks
//! required filter parameters before calls leave the process, and exposes the
//! whole thing as a small Try It proxy.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::CacheStore;
pub use client::ApiClient;
pub use config::Config;
pub use error::{ApiError, Result};
pub use tasks::spawn_cleanup_task;
