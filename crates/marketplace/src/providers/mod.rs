//! Marketplace provider clients.
//!
//! The set of providers is closed: each one is a variant of [`Provider`].
//! Supporting a new marketplace means adding a client module and a variant.

pub mod provider_a;
pub mod provider_b;

use std::str::FromStr;

use common::{Fields, Outcome, keys};
use listing::ListingRequest;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AttemptError;
use crate::transport::{Transport, TransportRequest};

pub use provider_a::ProviderA;
pub use provider_b::ProviderB;

/// Stable identifier of a marketplace provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    ProviderA,
    ProviderB,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::ProviderA, ProviderId::ProviderB];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::ProviderA => "provider_a",
            ProviderId::ProviderB => "provider_b",
        }
    }

    /// Returns true if the provider's protocol has a separately retriable
    /// publish step.
    pub fn supports_retry_publish(&self) -> bool {
        matches!(self, ProviderId::ProviderB)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The string did not name a known provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown marketplace: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// A listing that now exists on a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCreated {
    pub provider: ProviderId,
    /// Provider-issued listing id.
    pub marketplace_id: String,
    /// Intermediate inventory item, for two-step providers.
    pub inventory_id: Option<String>,
}

impl From<ListingCreated> for Outcome {
    fn from(created: ListingCreated) -> Self {
        let mut payload = Fields::new();
        payload.insert(keys::MARKETPLACE_ID.to_string(), created.marketplace_id.into());
        payload.insert(keys::MARKETPLACE.to_string(), created.provider.as_str().into());
        if let Some(inventory_id) = created.inventory_id {
            payload.insert(keys::INVENTORY_ID.to_string(), inventory_id.into());
        }
        Outcome::success(payload)
    }
}

/// One configured marketplace client.
#[derive(Clone)]
pub enum Provider {
    A(ProviderA),
    B(ProviderB),
}

impl Provider {
    pub fn id(&self) -> ProviderId {
        match self {
            Provider::A(_) => ProviderId::ProviderA,
            Provider::B(_) => ProviderId::ProviderB,
        }
    }

    /// Runs the provider's full listing protocol.
    pub async fn create_listing(&self, request: &ListingRequest) -> Outcome {
        let result = match self {
            Provider::A(client) => client.create_listing(request).await,
            Provider::B(client) => client.create_listing(request).await,
        };
        result.map_or_else(Outcome::from, Outcome::from)
    }

    /// Re-runs only the publish step for an existing inventory item.
    ///
    /// Returns `None` for providers without a separate publish step; no call
    /// is made in that case.
    pub async fn retry_publish(&self, inventory_id: &str) -> Option<Outcome> {
        match self {
            Provider::A(_) => None,
            Provider::B(client) => {
                let outcome = match client.retry_publish(inventory_id).await {
                    Ok(created) => {
                        let listing_id = created.marketplace_id.clone();
                        Outcome::from(created).with_payload(keys::LISTING_ID, listing_id)
                    }
                    Err(failure) => failure.into(),
                };
                Some(outcome)
            }
        }
    }
}

impl From<ProviderA> for Provider {
    fn from(client: ProviderA) -> Self {
        Provider::A(client)
    }
}

impl From<ProviderB> for Provider {
    fn from(client: ProviderB) -> Self {
        Provider::B(client)
    }
}

/// Joins a base URL and a path without doubling the slash.
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Appends `segments` to a base URL, percent-encoding each one so caller
/// supplied ids cannot add path segments, a query or a fragment.
///
/// Returns `None` if the base cannot carry a path.
fn segment_endpoint(base_url: &str, segments: &[&str]) -> Option<String> {
    let mut url = Url::parse(base_url).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url.into())
}

/// Sends one attempt and extracts `id_field` from a 200/201 answer.
async fn send_expecting(
    transport: &dyn Transport,
    operation: &'static str,
    request: TransportRequest,
    id_field: &'static str,
) -> Result<String, AttemptError> {
    let response = transport
        .send(request)
        .await
        .map_err(|source| AttemptError::Transport { operation, source })?;

    if !response.is_success() {
        return Err(AttemptError::Status {
            operation,
            status: response.status,
        });
    }

    response
        .id_field(id_field)
        .ok_or(AttemptError::MissingField {
            operation,
            field: id_field,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_round_trip_through_str() {
        for id in ProviderId::ALL {
            assert_eq!(id.as_str().parse::<ProviderId>(), Ok(id));
        }
        assert_eq!(
            "provider_c".parse::<ProviderId>(),
            Err(UnknownProvider("provider_c".to_string()))
        );
    }

    #[test]
    fn test_provider_id_serializes_as_wire_id() {
        assert_eq!(
            serde_json::to_value(ProviderId::ProviderB).unwrap(),
            serde_json::json!("provider_b")
        );
    }

    #[test]
    fn test_retry_publish_capability() {
        assert!(!ProviderId::ProviderA.supports_retry_publish());
        assert!(ProviderId::ProviderB.supports_retry_publish());
    }

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            endpoint("http://localhost:3001/api/", "/products"),
            "http://localhost:3001/api/products"
        );
        assert_eq!(
            endpoint("http://localhost:3002", "inventory"),
            "http://localhost:3002/inventory"
        );
    }

    #[test]
    fn test_segment_endpoint_encodes_each_segment() {
        assert_eq!(
            segment_endpoint("http://localhost:3002", &["inventory", "67890", "publish"]).as_deref(),
            Some("http://localhost:3002/inventory/67890/publish")
        );
        assert_eq!(
            segment_endpoint("http://localhost:3002/", &["inventory", "a/b?c#d", "publish"]).as_deref(),
            Some("http://localhost:3002/inventory/a%2Fb%3Fc%23d/publish")
        );
        assert_eq!(segment_endpoint("not a url", &["inventory"]), None);
    }

    #[test]
    fn test_listing_created_outcome() {
        let outcome: Outcome = ListingCreated {
            provider: ProviderId::ProviderB,
            marketplace_id: "L123".to_string(),
            inventory_id: Some("67890".to_string()),
        }
        .into();

        assert!(outcome.is_success());
        assert_eq!(outcome.payload_str(keys::MARKETPLACE_ID), Some("L123"));
        assert_eq!(outcome.payload_str(keys::MARKETPLACE), Some("provider_b"));
        assert_eq!(outcome.payload_str(keys::INVENTORY_ID), Some("67890"));
    }
}
