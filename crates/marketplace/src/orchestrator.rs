//! Listing orchestrator: validates once, dispatches to every provider,
//! aggregates the outcomes.

use std::str::FromStr;
use std::time::Instant;

use common::{Outcome, RequestId, keys};
use futures_util::future::join_all;
use listing::{ListingRequest, RawListingParams, Validator};

use crate::providers::{Provider, ProviderB, ProviderId};
use crate::results::ProviderResultSet;
use crate::state::OrchestrationState;

/// How providers are invoked within one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// One provider after another, in configured order.
    #[default]
    Sequential,
    /// All providers at once. Results still come back in configured order and
    /// one provider's failure never cancels another's call.
    Concurrent,
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(DispatchMode::Sequential),
            "concurrent" => Ok(DispatchMode::Concurrent),
            other => Err(format!("unknown dispatch mode: {other}")),
        }
    }
}

/// Drives every configured provider for one listing request.
///
/// Holds only immutable configuration, so one instance can serve any number
/// of concurrent requests. Never panics or errors out: every path ends in an
/// [`Outcome`].
pub struct ListingOrchestrator<V: Validator> {
    validator: V,
    providers: Vec<Provider>,
    dispatch: DispatchMode,
}

impl<V: Validator> ListingOrchestrator<V> {
    /// Creates an orchestrator that dispatches sequentially in the given order.
    pub fn new(validator: V, providers: Vec<Provider>) -> Self {
        Self {
            validator,
            providers,
            dispatch: DispatchMode::Sequential,
        }
    }

    pub fn with_dispatch_mode(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Configured provider ids, in dispatch order.
    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(Provider::id).collect()
    }

    /// Validates `raw` and lists the product on every configured provider.
    ///
    /// A validation failure is returned unchanged before any network call.
    /// Otherwise every provider is attempted, whatever happened to the
    /// previous ones, and the outcomes are aggregated.
    #[tracing::instrument(skip(self, raw), fields(request_id = %RequestId::new()))]
    pub async fn create_listing(&self, raw: &RawListingParams) -> Outcome {
        metrics::counter!("listing_requests_total").increment(1);
        let started = Instant::now();
        let mut state = OrchestrationState::default();

        let request = match self.validator.validate(raw) {
            Ok(request) => request,
            Err(failure) => {
                advance(&mut state, OrchestrationState::Done);
                tracing::info!(error = %failure, "listing request rejected by validation");
                return failure.into();
            }
        };

        advance(&mut state, OrchestrationState::Dispatching);
        let results = self.dispatch(&request).await;

        advance(&mut state, OrchestrationState::Aggregating);
        let outcome = results.aggregate();
        advance(&mut state, OrchestrationState::Done);

        if outcome.meta_flag(keys::PARTIAL_SUCCESS) {
            metrics::counter!("listing_partial_success_total").increment(1);
        }
        metrics::histogram!("listing_duration_seconds").record(started.elapsed().as_secs_f64());

        outcome
    }

    /// Invokes every provider and collects their outcomes in configured order.
    pub async fn dispatch(&self, request: &ListingRequest) -> ProviderResultSet {
        let mut results = ProviderResultSet::new();

        match self.dispatch {
            DispatchMode::Sequential => {
                for provider in &self.providers {
                    let outcome = provider.create_listing(request).await;
                    log_provider_result(provider.id(), &outcome);
                    results.insert(provider.id(), outcome);
                }
            }
            DispatchMode::Concurrent => {
                let calls = self.providers.iter().map(|provider| async move {
                    let outcome = provider.create_listing(request).await;
                    log_provider_result(provider.id(), &outcome);
                    (provider.id(), outcome)
                });
                for (id, outcome) in join_all(calls).await {
                    results.insert(id, outcome);
                }
            }
        }

        results
    }

    /// Re-runs only the publish step for a provider that supports it.
    ///
    /// Unknown providers, providers without a separate publish step,
    /// providers that are not configured and malformed inventory ids are
    /// answered with a failure and no network call.
    #[tracing::instrument(skip(self))]
    pub async fn retry_failed_publish(&self, provider: &str, inventory_id: &str) -> Outcome {
        let id = match provider.parse::<ProviderId>() {
            Ok(id) if id.supports_retry_publish() => id,
            _ => {
                tracing::warn!("retry publish requested for unsupported marketplace");
                return Outcome::failure(format!("Unsupported marketplace for retry: {provider}"));
            }
        };

        let Some(client) = self.providers.iter().find(|p| p.id() == id) else {
            tracing::warn!("retry publish requested for unconfigured marketplace");
            return Outcome::failure(format!("Marketplace not configured: {provider}"));
        };

        if !ProviderB::is_valid_inventory_id(inventory_id) {
            tracing::warn!("retry publish requested with malformed inventory id");
            return Outcome::failure(format!("Invalid inventory id for retry: {inventory_id:?}"))
                .with_meta(keys::MARKETPLACE, id.as_str());
        }

        match client.retry_publish(inventory_id).await {
            Some(outcome) => {
                log_provider_result(id, &outcome);
                outcome
            }
            None => Outcome::failure(format!("Unsupported marketplace for retry: {provider}")),
        }
    }
}

fn advance(state: &mut OrchestrationState, next: OrchestrationState) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid orchestration transition {state} -> {next}"
    );
    tracing::debug!(from = %state, to = %next, "orchestration state changed");
    *state = next;
}

fn log_provider_result(provider: ProviderId, outcome: &Outcome) {
    if outcome.is_success() {
        metrics::counter!("listing_provider_results_total", "provider" => provider.as_str(), "result" => "success")
            .increment(1);
        tracing::info!(
            %provider,
            marketplace_id = outcome.payload_str(keys::MARKETPLACE_ID),
            "listing created"
        );
    } else {
        metrics::counter!("listing_provider_results_total", "provider" => provider.as_str(), "result" => "failure")
            .increment(1);
        tracing::warn!(
            %provider,
            error = outcome.error_message(),
            recoverability = outcome.meta_str(keys::RECOVERABILITY),
            inventory_id = outcome.meta_str(keys::INVENTORY_ID),
            "listing failed"
        );
    }
}
