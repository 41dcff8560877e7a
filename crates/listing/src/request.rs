//! Listing request value objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unvalidated listing parameters as received from a caller.
///
/// Every field is optional and untyped; JSON `null` is treated the same as
/// an absent field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListingParams {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub price_cents: Option<Value>,
    #[serde(default)]
    pub seller_sku: Option<Value>,
}

impl RawListingParams {
    /// Creates params with all three fields present.
    pub fn new(
        title: impl Into<Value>,
        price_cents: impl Into<Value>,
        seller_sku: impl Into<Value>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            price_cents: Some(price_cents.into()),
            seller_sku: Some(seller_sku.into()),
        }
    }
}

/// A validated request to list one product on every configured marketplace.
///
/// Immutable once built; provider clients only read from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRequest {
    title: String,
    price_cents: i64,
    seller_sku: String,
}

impl ListingRequest {
    /// Creates a listing request from already-validated values.
    pub fn new(title: impl Into<String>, price_cents: i64, seller_sku: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price_cents,
            seller_sku: seller_sku.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }

    pub fn seller_sku(&self) -> &str {
        &self.seller_sku
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_params_treat_null_as_absent() {
        let raw: RawListingParams = serde_json::from_value(json!({
            "title": null,
            "price_cents": 1999
        }))
        .unwrap();

        assert!(raw.title.is_none());
        assert_eq!(raw.price_cents, Some(json!(1999)));
        assert!(raw.seller_sku.is_none());
    }

    #[test]
    fn listing_request_accessors() {
        let request = ListingRequest::new("Test Product", 1999, "ABC123");
        assert_eq!(request.title(), "Test Product");
        assert_eq!(request.price_cents(), 1999);
        assert_eq!(request.seller_sku(), "ABC123");
    }
}
