//! HTTP API server for multi-marketplace product listing.
//!
//! Exposes the listing orchestrator over REST, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use listing::ProductParamsValidator;
use marketplace::{
    HttpTransport, ListingOrchestrator, Provider, ProviderA, ProviderB, Transport,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use error::ApiError;
use routes::products::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/v1/products", post(routes::products::create))
        .route(
            "/api/v1/products/retry_publish",
            post(routes::products::retry_publish),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state: both provider clients over one shared
/// HTTP transport, in configured order A then B.
pub fn create_default_state(config: &Config) -> Result<Arc<AppState>, ApiError> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.http_timeout)?);
    let retry = config.retry_policy();

    let providers = vec![
        Provider::from(ProviderA::new(
            transport.clone(),
            config.provider_a_base_url.as_str(),
            retry,
        )),
        Provider::from(ProviderB::new(
            transport,
            config.provider_b_base_url.as_str(),
            retry,
        )),
    ];

    let orchestrator = ListingOrchestrator::new(ProductParamsValidator::new(), providers)
        .with_dispatch_mode(config.dispatch_mode());

    Ok(Arc::new(AppState { orchestrator }))
}
