//! Filter validation
//!
//! `validate_filters` reports problems for callers that degrade gracefully;
//! `validate_filters_or_throw` turns them into an error.

use serde::Serialize;

use crate::error::{ApiError, Result};
use crate::filters::table::{get_filter_requirement, FilterRequirement};
use crate::models::QueryParams;

/// Placeholder shown when no example value is registered for a parameter.
const GENERIC_EXAMPLE: &str = "<value>";

// == Validation Result ==
/// Outcome of checking a query against an endpoint's filter requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub missing_params: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl ValidationResult {
    fn valid() -> Self {
        Self {
            is_valid: true,
            missing_params: Vec::new(),
            error_message: None,
            suggestions: None,
        }
    }
}

/// Checks that every required parameter of `endpoint` is present and not blank.
pub fn validate_filters(endpoint: &str, query_params: Option<&QueryParams>) -> ValidationResult {
    let Some(requirement) = get_filter_requirement(endpoint) else {
        return ValidationResult::valid();
    };

    let missing: Vec<&str> = requirement
        .required_params
        .iter()
        .copied()
        .filter(|param| {
            query_params
                .and_then(|params| params.get(param))
                .map_or(true, |value| value.trim().is_empty())
        })
        .collect();

    if missing.is_empty() {
        return ValidationResult::valid();
    }

    ValidationResult {
        is_valid: false,
        missing_params: missing.iter().map(|param| param.to_string()).collect(),
        error_message: Some(error_message(endpoint, requirement, &missing)),
        suggestions: Some(
            missing
                .iter()
                .map(|param| {
                    format!(
                        "Add {param}={} to the query parameters",
                        example(requirement, param)
                    )
                })
                .collect(),
        ),
    }
}

/// Like [`validate_filters`], but fails with [`ApiError::Validation`] carrying
/// the diagnostic message.
pub fn validate_filters_or_throw(endpoint: &str, query_params: Option<&QueryParams>) -> Result<()> {
    let result = validate_filters(endpoint, query_params);
    if result.is_valid {
        return Ok(());
    }
    Err(ApiError::Validation(
        result.error_message.unwrap_or_default(),
    ))
}

fn example(requirement: &FilterRequirement, param: &str) -> &'static str {
    requirement.example_for(param).unwrap_or(GENERIC_EXAMPLE)
}

fn error_message(endpoint: &str, requirement: &FilterRequirement, missing: &[&str]) -> String {
    let mut lines = vec![
        format!(
            "Missing required filter parameter(s) for {endpoint}: {}",
            missing.join(", ")
        ),
        String::new(),
        format!("{}.", requirement.description),
        "Unfiltered responses from this endpoint are very large, so a filter is mandatory."
            .to_string(),
        String::new(),
        "Required parameters:".to_string(),
    ];
    lines.extend(
        missing
            .iter()
            .map(|param| format!("  - {param} (e.g. \"{}\")", example(requirement, param))),
    );

    if !requirement.optional_params.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Optional parameters: {}",
            requirement.optional_params.join(", ")
        ));
    }

    lines.join("\n")
}
