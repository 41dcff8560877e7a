//! Product parameter validation.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{FieldError, ValidationFailure};
use crate::request::{ListingRequest, RawListingParams};

/// Exclusive upper bound for `price_cents` ($1,000,000).
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

const TITLE_MIN_LEN: usize = 3;
const TITLE_MAX_LEN: usize = 255;
const SKU_MIN_LEN: usize = 3;
const SKU_MAX_LEN: usize = 50;

static TITLE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9 \t\r\n\x0B\x0C\-_]+$").expect("title pattern is valid"));

static SKU_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9\-_]+$").expect("sku pattern is valid"));

/// Turns raw caller input into a [`ListingRequest`] or explains why it cannot.
pub trait Validator: Send + Sync {
    fn validate(&self, raw: &RawListingParams) -> Result<ListingRequest, ValidationFailure>;
}

/// Validates title, price and seller SKU of a product listing.
///
/// Presence is checked first and reported on its own. Once every field is
/// present, all rule violations are collected rather than stopping at the
/// first one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductParamsValidator;

impl ProductParamsValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for ProductParamsValidator {
    fn validate(&self, raw: &RawListingParams) -> Result<ListingRequest, ValidationFailure> {
        let (Some(title), Some(price), Some(sku)) = (
            present(&raw.title),
            present(&raw.price_cents),
            present(&raw.seller_sku),
        ) else {
            let missing: Vec<&'static str> = [
                ("title", present(&raw.title).is_none()),
                ("price_cents", present(&raw.price_cents).is_none()),
                ("seller_sku", present(&raw.seller_sku).is_none()),
            ]
            .into_iter()
            .filter_map(|(field, missing)| missing.then_some(field))
            .collect();

            tracing::warn!(?missing, "product params missing required fields");
            return Err(ValidationFailure::MissingFields(missing));
        };

        let mut errors = Vec::new();

        let title = as_text(title);
        check_text(
            &mut errors,
            "title",
            &title,
            (TITLE_MIN_LEN, TITLE_MAX_LEN),
            &TITLE_FORMAT,
            "can only contain letters, numbers, spaces, hyphens and underscores",
        );

        let price_cents = check_price(&mut errors, price);

        let sku = as_text(sku);
        check_text(
            &mut errors,
            "seller_sku",
            &sku,
            (SKU_MIN_LEN, SKU_MAX_LEN),
            &SKU_FORMAT,
            "can only contain uppercase letters, numbers, hyphens and underscores",
        );

        match price_cents {
            Some(price_cents) if errors.is_empty() => {
                Ok(ListingRequest::new(title, price_cents, sku))
            }
            _ => {
                tracing::warn!(?errors, "product params validation failed");
                Err(ValidationFailure::Invalid(errors))
            }
        }
    }
}

fn present(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn check_text(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
    format: &Regex,
    format_message: &str,
) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "cannot be empty"));
    }

    let len = value.chars().count();
    if len < min {
        errors.push(FieldError::new(
            field,
            format!("is too short (minimum is {min} characters)"),
        ));
    }
    if len > max {
        errors.push(FieldError::new(
            field,
            format!("is too long (maximum is {max} characters)"),
        ));
    }

    if !format.is_match(value) {
        errors.push(FieldError::new(field, format_message));
    }
}

fn check_price(errors: &mut Vec<FieldError>, value: &Value) -> Option<i64> {
    let Some(price) = value.as_i64() else {
        if value.as_u64().is_some() {
            errors.push(FieldError::new(
                "price_cents",
                format!("must be less than {MAX_PRICE_CENTS}"),
            ));
        } else {
            errors.push(FieldError::new("price_cents", "must be an integer"));
        }
        return None;
    };

    if price <= 0 {
        errors.push(FieldError::new("price_cents", "must be greater than 0"));
    }
    if price >= MAX_PRICE_CENTS {
        errors.push(FieldError::new(
            "price_cents",
            format!("must be less than {MAX_PRICE_CENTS}"),
        ));
    }

    Some(price)
}
