//! Validation error types.

use common::{Outcome, keys};
use serde::Serialize;
use thiserror::Error;

/// A single rule violation on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Why a set of listing parameters was rejected.
///
/// Always blocking: a request that fails validation never reaches a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// One or more required fields were absent.
    #[error("Missing required fields")]
    MissingFields(Vec<&'static str>),

    /// All fields were present but at least one broke a rule.
    #[error("Validation failed")]
    Invalid(Vec<FieldError>),
}

/// Context tag attached to every validation outcome.
const VALIDATION_CONTEXT: &str = "product_params";

impl From<ValidationFailure> for Outcome {
    fn from(failure: ValidationFailure) -> Self {
        let outcome = Outcome::failure(failure.to_string())
            .with_meta(keys::VALIDATION, VALIDATION_CONTEXT);

        match failure {
            ValidationFailure::MissingFields(fields) => {
                outcome.with_payload(keys::MISSING_FIELDS, fields)
            }
            ValidationFailure::Invalid(errors) => outcome.with_payload(
                keys::ERRORS,
                serde_json::to_value(errors).unwrap_or_default(),
            ),
        }
    }
}
