//! Cache key and TTL derivation.

use crate::models::{HttpMethod, QueryParams};

/// TTL in milliseconds for endpoints matching no rule.
pub const DEFAULT_ENDPOINT_TTL_MS: u64 = 30 * 60 * 1000;

/// Ordered `(path fragment, TTL ms)` rules; the first fragment contained in
/// the endpoint wins. Faster-changing data gets a shorter TTL.
pub const TTL_RULES: &[(&str, u64)] = &[
    // reference codes
    ("codes", 60 * 60 * 1000),
    ("service-corridor", 60 * 60 * 1000),
    ("banks", 30 * 60 * 1000),
    ("branches", 30 * 60 * 1000),
    // exchange rates
    ("rates", 15 * 60 * 1000),
    ("account/validate", 5 * 60 * 1000),
];

/// Builds the canonical cache key `"{METHOD}:{endpoint}[?{sorted query}]"`.
///
/// Parameters are sorted by name so that insertion order never changes the
/// key. Absent or empty values are left out, as they never reach the wire.
pub fn generate_cache_key(
    method: HttpMethod,
    endpoint: &str,
    query_params: Option<&QueryParams>,
) -> String {
    let mut key = format!("{method}:{endpoint}");

    let mut pairs: Vec<(&str, &str)> = query_params
        .map(|params| params.present().collect())
        .unwrap_or_default();
    if pairs.is_empty() {
        return key;
    }

    pairs.sort_by(|a, b| a.0.cmp(b.0));
    let query = pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    key.push('?');
    key.push_str(&query);
    key
}

/// Returns the TTL in milliseconds for responses from `endpoint`.
pub fn get_cache_ttl(endpoint: &str) -> u64 {
    TTL_RULES
        .iter()
        .find(|(fragment, _)| endpoint.contains(*fragment))
        .map(|(_, ttl)| *ttl)
        .unwrap_or(DEFAULT_ENDPOINT_TTL_MS)
}
