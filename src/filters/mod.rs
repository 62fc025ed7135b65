//! Filter Module
//!
//! Required query filters for master-data endpoints and their validation.

mod table;
mod validation;

pub use table::{
    get_filter_requirement, get_optional_params, get_required_params, requires_filters,
    FilterRequirement, FILTER_REQUIREMENTS,
};
pub use validation::{validate_filters, validate_filters_or_throw, ValidationResult};
