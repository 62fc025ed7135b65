//! Filter requirement table
//!
//! Master-data endpoints whose unfiltered responses are large enough
//! (hundreds of KB) that callers must narrow them with query parameters.

use serde::Serialize;

// == Filter Requirement ==
/// Query parameters an endpoint family requires and accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequirement {
    /// Substring matched against the request path
    pub endpoint_fragment: &'static str,
    /// Parameters that must be present and non-blank
    pub required_params: &'static [&'static str],
    /// Parameters that are recognized but optional
    pub optional_params: &'static [&'static str],
    /// Human-readable endpoint description, used in diagnostics
    pub description: &'static str,
    /// Example values per parameter, used in diagnostics
    pub examples: &'static [(&'static str, &'static str)],
}

impl FilterRequirement {
    /// Example value registered for `param`.
    pub fn example_for(&self, param: &str) -> Option<&'static str> {
        self.examples
            .iter()
            .find(|(name, _)| *name == param)
            .map(|(_, example)| *example)
    }
}

/// Requirements in lookup order. `/branches` is listed before `/banks` so
/// that `/banks/{id}/branches` resolves to the branch search.
pub static FILTER_REQUIREMENTS: &[FilterRequirement] = &[
    FilterRequirement {
        endpoint_fragment: "/codes",
        required_params: &["code_type"],
        optional_params: &[],
        description: "Get Codes returns master codes of a single type",
        examples: &[("code_type", "NATIONALITY")],
    },
    FilterRequirement {
        endpoint_fragment: "/branches",
        required_params: &["bank_id"],
        optional_params: &["search_term", "city"],
        description: "Branch Search returns the branches of one bank",
        examples: &[
            ("bank_id", "1001"),
            ("search_term", "MAIN"),
            ("city", "KARACHI"),
        ],
    },
    FilterRequirement {
        endpoint_fragment: "/banks",
        required_params: &["receiving_country_code"],
        optional_params: &["receiving_mode", "correspondent"],
        description: "Get Banks returns the banks of one receiving country",
        examples: &[
            ("receiving_country_code", "PK"),
            ("receiving_mode", "B"),
            ("correspondent", "SF"),
        ],
    },
    FilterRequirement {
        endpoint_fragment: "/rates",
        required_params: &["receiving_country_code"],
        optional_params: &["receiving_currency_code", "receiving_mode"],
        description: "Get Rates returns exchange rates towards one receiving country",
        examples: &[
            ("receiving_country_code", "PK"),
            ("receiving_currency_code", "PKR"),
            ("receiving_mode", "B"),
        ],
    },
];

/// First requirement whose fragment occurs in `endpoint`.
pub fn get_filter_requirement(endpoint: &str) -> Option<&'static FilterRequirement> {
    FILTER_REQUIREMENTS
        .iter()
        .find(|requirement| endpoint.contains(requirement.endpoint_fragment))
}

/// Whether `endpoint` has a filter requirement at all.
pub fn requires_filters(endpoint: &str) -> bool {
    get_filter_requirement(endpoint).is_some()
}

/// Required parameter names for `endpoint`, empty when unrestricted.
pub fn get_required_params(endpoint: &str) -> &'static [&'static str] {
    get_filter_requirement(endpoint)
        .map(|requirement| requirement.required_params)
        .unwrap_or(&[])
}

/// Optional parameter names for `endpoint`.
pub fn get_optional_params(endpoint: &str) -> &'static [&'static str] {
    get_filter_requirement(endpoint)
        .map(|requirement| requirement.optional_params)
        .unwrap_or(&[])
}
