//! API Module
//!
//! HTTP handlers and routing for the Try It proxy and cache diagnostics.
//!
//! # Endpoints
//! - `POST /try-it` - Proxy one API call through the cache
//! - `GET /filters`, `POST /filters/validate` - Filter requirements
//! - `POST /cache/key`, `GET /cache/stats`, `POST /cache/stats/reset`,
//!   `DELETE /cache` - Cache diagnostics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
