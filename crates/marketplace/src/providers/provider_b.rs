//! Provider B: two-call protocol, create inventory then publish it.

use std::sync::Arc;

use listing::ListingRequest;
use serde_json::json;

use super::{ListingCreated, ProviderId, endpoint, segment_endpoint, send_expecting};
use crate::error::{ProviderFailure, Recoverability};
use crate::retry::RetryPolicy;
use crate::transport::{Transport, TransportRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3002";

const INVENTORY_OPERATION: &str = "provider_b_create_inventory";
const INVENTORY_LABEL: &str = "Provider B inventory creation";
const PUBLISH_OPERATION: &str = "provider_b_publish";
const PUBLISH_LABEL: &str = "Provider B publish";

/// Client for provider B.
///
/// 1. `POST {base}/inventory` with `{title, price_cents, seller_sku}` answers `{inventory_id}`
/// 2. `POST {base}/inventory/{inventory_id}/publish` answers `{listing_id}`
///
/// Each step is retried on its own. A publish that runs out of attempts
/// leaves a created inventory item behind, so that failure is recoverable
/// through [`ProviderB::retry_publish`].
#[derive(Clone)]
pub struct ProviderB {
    transport: Arc<dyn Transport>,
    base_url: String,
    retry: RetryPolicy,
}

impl ProviderB {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            retry,
        }
    }

    /// Returns true if `inventory_id` looks like an id provider B issues:
    /// non-empty ASCII letters, digits, `-` and `_`.
    pub fn is_valid_inventory_id(inventory_id: &str) -> bool {
        !inventory_id.is_empty()
            && inventory_id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }

    /// Creates an inventory item and publishes it.
    ///
    /// Publishing is never attempted if the inventory item could not be created.
    #[tracing::instrument(skip(self, request), fields(provider = "provider_b"))]
    pub async fn create_listing(
        &self,
        request: &ListingRequest,
    ) -> Result<ListingCreated, ProviderFailure> {
        let inventory_id = self.create_inventory_item(request).await?;
        self.publish_listing(&inventory_id).await
    }

    /// Re-runs only the publish step for an inventory item created earlier.
    #[tracing::instrument(skip(self), fields(provider = "provider_b"))]
    pub async fn retry_publish(&self, inventory_id: &str) -> Result<ListingCreated, ProviderFailure> {
        self.publish_listing(inventory_id).await
    }

    async fn create_inventory_item(&self, request: &ListingRequest) -> Result<String, ProviderFailure> {
        let url = endpoint(&self.base_url, "inventory");
        let body = json!({
            "title": request.title(),
            "price_cents": request.price_cents(),
            "seller_sku": request.seller_sku(),
        });

        self.retry
            .run(INVENTORY_OPERATION, || {
                let transport = Arc::clone(&self.transport);
                let request = TransportRequest::post(&url).json(body.clone());
                async move {
                    send_expecting(transport.as_ref(), INVENTORY_LABEL, request, "inventory_id").await
                }
            })
            .await
            .map_err(|exhausted| ProviderFailure::exhausted(ProviderId::ProviderB, exhausted))
    }

    async fn publish_listing(&self, inventory_id: &str) -> Result<ListingCreated, ProviderFailure> {
        let Some(url) = segment_endpoint(&self.base_url, &["inventory", inventory_id, "publish"])
        else {
            return Err(ProviderFailure {
                provider: ProviderId::ProviderB,
                message: format!("Provider B base url cannot carry a path: {}", self.base_url),
                status_code: None,
                inventory_id: Some(inventory_id.to_string()),
                recoverability: Recoverability::Terminal,
            });
        };

        let listing_id = self
            .retry
            .run(PUBLISH_OPERATION, || {
                let transport = Arc::clone(&self.transport);
                let request = TransportRequest::post(&url);
                async move {
                    send_expecting(transport.as_ref(), PUBLISH_LABEL, request, "listing_id").await
                }
            })
            .await
            .map_err(|exhausted| {
                ProviderFailure::exhausted(ProviderId::ProviderB, exhausted).resumable_at(inventory_id)
            })?;

        Ok(ListingCreated {
            provider: ProviderId::ProviderB,
            marketplace_id: listing_id,
            inventory_id: Some(inventory_id.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InMemoryTransport;
    use reqwest::Method;
    use serde_json::Value;

    const BASE: &str = "http://provider-b.test";

    fn client(transport: &InMemoryTransport) -> ProviderB {
        ProviderB::new(Arc::new(transport.clone()), BASE, RetryPolicy::immediate(3))
    }

    fn request() -> ListingRequest {
        ListingRequest::new("Test Product", 1999, "ABC123")
    }

    fn inventory_created(transport: &InMemoryTransport) {
        transport.respond(
            Method::POST,
            "/inventory",
            200,
            json!({ "inventory_id": "67890", "status": "created" }),
        );
    }

    #[tokio::test]
    async fn test_both_steps_succeed() {
        let transport = InMemoryTransport::new();
        inventory_created(&transport);
        transport.respond(
            Method::POST,
            "/inventory/67890/publish",
            200,
            json!({ "listing_id": "L123", "status": "published" }),
        );

        let created = client(&transport).create_listing(&request()).await.unwrap();

        assert_eq!(created.marketplace_id, "L123");
        assert_eq!(created.inventory_id.as_deref(), Some("67890"));
        assert_eq!(
            transport.calls()[0].body,
            Some(json!({ "title": "Test Product", "price_cents": 1999, "seller_sku": "ABC123" }))
        );
        assert_eq!(transport.calls()[1].body, None);
    }

    #[tokio::test]
    async fn test_inventory_failure_never_publishes() {
        let transport = InMemoryTransport::new();
        transport.respond(Method::POST, "/inventory", 500, Value::Null);

        let failure = client(&transport).create_listing(&request()).await.unwrap_err();

        assert_eq!(transport.call_count("/inventory"), 3);
        assert_eq!(transport.total_calls(), 3);
        assert_eq!(failure.inventory_id, None);
        assert_eq!(failure.recoverability, Recoverability::Terminal);
        assert_eq!(
            failure.message,
            "max retries exceeded: Provider B inventory creation failed with status 500"
        );
    }

    #[tokio::test]
    async fn test_publish_failure_is_recoverable() {
        let transport = InMemoryTransport::new();
        inventory_created(&transport);
        transport.respond(Method::POST, "/inventory/67890/publish", 500, Value::Null);

        let failure = client(&transport).create_listing(&request()).await.unwrap_err();

        assert_eq!(transport.call_count("/inventory"), 1);
        assert_eq!(transport.call_count("/inventory/67890/publish"), 3);
        assert_eq!(failure.recoverability, Recoverability::Recoverable);
        assert_eq!(failure.inventory_id.as_deref(), Some("67890"));
        assert_eq!(failure.status_code, Some(500));
    }

    #[tokio::test]
    async fn test_publish_transport_fault_is_still_recoverable() {
        let transport = InMemoryTransport::new();
        inventory_created(&transport);
        transport.fail(Method::POST, "/inventory/67890/publish", "connection reset");

        let failure = client(&transport).create_listing(&request()).await.unwrap_err();

        assert_eq!(failure.recoverability, Recoverability::Recoverable);
    }

    #[tokio::test]
    async fn test_retry_publish_success() {
        let transport = InMemoryTransport::new();
        transport.respond(
            Method::POST,
            "/inventory/67890/publish",
            200,
            json!({ "listing_id": "L123", "status": "published" }),
        );

        let created = client(&transport).retry_publish("67890").await.unwrap();

        assert_eq!(created.marketplace_id, "L123");
        assert_eq!(transport.call_count("/inventory"), 0);
        assert_eq!(transport.call_count("/inventory/67890/publish"), 1);
    }

    #[tokio::test]
    async fn test_retry_publish_encodes_inventory_id() {
        let transport = InMemoryTransport::new();
        transport.respond(Method::POST, "/inventory/67890%23/publish", 200, json!({ "listing_id": "L123" }));
        transport.respond(Method::POST, "/inventory/67890", 200, json!({ "listing_id": "X" }));

        client(&transport).retry_publish("67890#").await.unwrap();

        assert_eq!(transport.total_calls(), 1);
        assert_eq!(
            transport.calls()[0].url,
            "http://provider-b.test/inventory/67890%23/publish"
        );
        assert_eq!(transport.call_count("/inventory/67890"), 0);
    }

    #[tokio::test]
    async fn test_retry_publish_with_unusable_base_url_makes_no_call() {
        let transport = InMemoryTransport::new();
        let client = ProviderB::new(Arc::new(transport.clone()), "provider-b", RetryPolicy::immediate(3));

        let failure = client.retry_publish("67890").await.unwrap_err();

        assert_eq!(transport.total_calls(), 0);
        assert_eq!(failure.recoverability, Recoverability::Terminal);
    }

    #[test]
    fn test_inventory_id_shape() {
        assert!(ProviderB::is_valid_inventory_id("67890"));
        assert!(ProviderB::is_valid_inventory_id("inv_01-AB"));
        for id in ["", " ", "../api/products#", "67890#", "a/b", "67890?x=1", "inv 1"] {
            assert!(!ProviderB::is_valid_inventory_id(id), "{id:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn test_retry_publish_failure_stays_recoverable() {
        let transport = InMemoryTransport::new();
        transport.respond(Method::POST, "/inventory/67890/publish", 500, Value::Null);

        let failure = client(&transport).retry_publish("67890").await.unwrap_err();

        assert_eq!(transport.call_count("/inventory/67890/publish"), 3);
        assert_eq!(failure.recoverability, Recoverability::Recoverable);
        assert_eq!(failure.inventory_id.as_deref(), Some("67890"));
    }
}
