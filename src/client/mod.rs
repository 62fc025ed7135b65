//! Client Module
//!
//! The request orchestrator and the transport it calls through.

mod api_client;
mod transport;

pub use api_client::{
    is_auth_endpoint, is_master_data_endpoint, ApiClient, AUTH_ENDPOINT_FRAGMENTS,
    MASTER_DATA_NAMESPACE,
};
pub use transport::{ReqwestTransport, Transport, TransportRequest};
