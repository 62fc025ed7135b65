//! Request and response models
//!
//! Types passed to and returned from the orchestrator, plus the DTOs used to
//! serialize/deserialize proxy request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    ApiRequest, CacheKeyRequest, CallOptions, FilterQuery, HttpMethod, InvalidateQuery, QueryParams,
    ValidateFiltersRequest,
};
pub use responses::{
    ApiResponse, CacheKeyResponse, FilterInfoResponse, HealthResponse, InvalidateResponse,
};
