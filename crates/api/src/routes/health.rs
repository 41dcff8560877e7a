//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::products::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Configured marketplaces, in dispatch order.
    pub marketplaces: Vec<&'static str>,
}

/// GET /health: liveness plus the configured marketplaces.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let marketplaces = state
        .orchestrator
        .provider_ids()
        .iter()
        .map(|id| id.as_str())
        .collect();

    Json(HealthResponse {
        status: "ok",
        marketplaces,
    })
}
