//! Provider A: single-call listing protocol.

use std::sync::Arc;

use listing::ListingRequest;
use serde_json::json;

use super::{ListingCreated, ProviderId, endpoint, send_expecting};
use crate::error::ProviderFailure;
use crate::retry::RetryPolicy;
use crate::transport::{Transport, TransportRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

const CREATE_OPERATION: &str = "provider_a_create";
const CREATE_LABEL: &str = "Provider A create";

/// Client for provider A.
///
/// `POST {base}/products` with `{name, price, sku}` answers `{id}`.
#[derive(Clone)]
pub struct ProviderA {
    transport: Arc<dyn Transport>,
    base_url: String,
    retry: RetryPolicy,
}

impl ProviderA {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            retry,
        }
    }

    /// Creates the listing in one retried call.
    ///
    /// On exhaustion nothing is resumable, so the failure never carries the
    /// recoverable flag.
    #[tracing::instrument(skip(self, request), fields(provider = "provider_a"))]
    pub async fn create_listing(
        &self,
        request: &ListingRequest,
    ) -> Result<ListingCreated, ProviderFailure> {
        let url = endpoint(&self.base_url, "products");
        let body = json!({
            "name": request.title(),
            "price": request.price_cents(),
            "sku": request.seller_sku(),
        });

        let marketplace_id = self
            .retry
            .run(CREATE_OPERATION, || {
                let transport = Arc::clone(&self.transport);
                let request = TransportRequest::post(&url).json(body.clone());
                async move { send_expecting(transport.as_ref(), CREATE_LABEL, request, "id").await }
            })
            .await
            .map_err(|exhausted| ProviderFailure::exhausted(ProviderId::ProviderA, exhausted))?;

        Ok(ListingCreated {
            provider: ProviderId::ProviderA,
            marketplace_id,
            inventory_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Recoverability;
    use crate::transport::InMemoryTransport;
    use reqwest::Method;
    use serde_json::Value;

    const BASE: &str = "http://provider-a.test/api";

    fn client(transport: &InMemoryTransport) -> ProviderA {
        ProviderA::new(Arc::new(transport.clone()), BASE, RetryPolicy::immediate(3))
    }

    fn request() -> ListingRequest {
        ListingRequest::new("Test Product", 1999, "ABC123")
    }

    #[tokio::test]
    async fn test_create_listing_success() {
        let transport = InMemoryTransport::new();
        transport.respond(
            Method::POST,
            "/api/products",
            201,
            json!({ "id": "12345", "status": "success" }),
        );

        let created = client(&transport).create_listing(&request()).await.unwrap();

        assert_eq!(created.marketplace_id, "12345");
        assert_eq!(created.provider, ProviderId::ProviderA);
        assert_eq!(transport.call_count("/api/products"), 1);
    }

    #[tokio::test]
    async fn test_maps_request_to_wire_shape() {
        let transport = InMemoryTransport::new();
        transport.respond(Method::POST, "/api/products", 201, json!({ "id": "12345" }));

        client(&transport).create_listing(&request()).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].url, "http://provider-a.test/api/products");
        assert_eq!(
            calls[0].body,
            Some(json!({ "name": "Test Product", "price": 1999, "sku": "ABC123" }))
        );
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let transport = InMemoryTransport::new();
        transport.respond(Method::POST, "/api/products", 503, Value::Null);
        transport.respond(Method::POST, "/api/products", 201, json!({ "id": "12345" }));

        let created = client(&transport).create_listing(&request()).await.unwrap();

        assert_eq!(created.marketplace_id, "12345");
        assert_eq!(transport.call_count("/api/products"), 2);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_terminal() {
        let transport = InMemoryTransport::new();
        transport.respond(Method::POST, "/api/products", 500, Value::Null);

        let failure = client(&transport).create_listing(&request()).await.unwrap_err();

        assert_eq!(transport.call_count("/api/products"), 3);
        assert_eq!(failure.provider, ProviderId::ProviderA);
        assert_eq!(failure.status_code, Some(500));
        assert_eq!(failure.recoverability, Recoverability::Terminal);
        assert_eq!(
            failure.message,
            "max retries exceeded: Provider A create failed with status 500"
        );
    }

    #[tokio::test]
    async fn test_transport_fault_is_unknown() {
        let transport = InMemoryTransport::new();
        transport.fail(Method::POST, "/api/products", "connection refused");

        let failure = client(&transport).create_listing(&request()).await.unwrap_err();

        assert_eq!(transport.call_count("/api/products"), 3);
        assert_eq!(failure.status_code, None);
        assert_eq!(failure.recoverability, Recoverability::Unknown);
    }

    #[tokio::test]
    async fn test_missing_id_counts_as_failed_attempt() {
        let transport = InMemoryTransport::new();
        transport.respond(Method::POST, "/api/products", 201, json!({ "status": "success" }));

        let failure = client(&transport).create_listing(&request()).await.unwrap_err();

        assert_eq!(transport.call_count("/api/products"), 3);
        assert_eq!(
            failure.message,
            "max retries exceeded: Provider A create returned no id"
        );
    }
}
