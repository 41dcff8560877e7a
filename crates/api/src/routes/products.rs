//! Product listing endpoints.
//!
//! Handlers only translate between HTTP and the orchestrator; every listing
//! decision is made in the `marketplace` crate.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use common::{Outcome, keys};
use listing::{ProductParamsValidator, RawListingParams};
use marketplace::ListingOrchestrator;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: ListingOrchestrator<ProductParamsValidator>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub product: RawListingParams,
}

#[derive(Deserialize)]
pub struct RetryPublishRequest {
    pub marketplace: String,
    pub inventory_id: String,
}

// -- Response types --

#[derive(Serialize)]
#[serde(untagged)]
pub enum ListingResponse {
    Success {
        status: &'static str,
        marketplace_results: Value,
    },
    Invalid {
        status: &'static str,
        error: String,
        details: Value,
    },
    Failed {
        status: &'static str,
        error: String,
        successful_marketplaces: Value,
        failed_marketplaces: Value,
        recoverable: bool,
    },
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum RetryPublishResponse {
    Success {
        status: &'static str,
        result: Value,
    },
    Failed {
        status: &'static str,
        error: String,
        recoverable: bool,
    },
}

// -- Handlers --

/// POST /api/v1/products: list one product on every configured marketplace.
///
/// 200 when every marketplace succeeded, 206 when some did, 422 when none
/// did or the parameters were rejected.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ListingResponse>), ApiError> {
    let Json(req) = payload?;
    let outcome = state.orchestrator.create_listing(&req.product).await;
    Ok(listing_response(outcome))
}

/// POST /api/v1/products/retry_publish: re-run a failed publish step.
#[tracing::instrument(skip(state, payload))]
pub async fn retry_publish(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RetryPublishRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RetryPublishResponse>), ApiError> {
    let Json(req) = payload?;
    let outcome = state
        .orchestrator
        .retry_failed_publish(&req.marketplace, &req.inventory_id)
        .await;

    if outcome.is_success() {
        let response = RetryPublishResponse::Success {
            status: "success",
            result: Value::Object(outcome.payload().clone()),
        };
        return Ok((StatusCode::OK, Json(response)));
    }

    let response = RetryPublishResponse::Failed {
        status: "error",
        error: error_message(&outcome),
        recoverable: outcome.meta_flag(keys::RECOVERABLE),
    };
    Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(response)))
}

fn listing_response(outcome: Outcome) -> (StatusCode, Json<ListingResponse>) {
    if outcome.is_success() {
        let results = outcome
            .payload()
            .get(keys::RESULTS)
            .cloned()
            .unwrap_or_default();
        let response = ListingResponse::Success {
            status: "success",
            marketplace_results: results,
        };
        return (StatusCode::OK, Json(response));
    }

    if outcome.meta_str(keys::VALIDATION).is_some() {
        let response = ListingResponse::Invalid {
            status: "error",
            error: error_message(&outcome),
            details: Value::Object(outcome.payload().clone()),
        };
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(response));
    }

    let status = if outcome.meta_flag(keys::PARTIAL_SUCCESS) {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let field = |key: &str| outcome.payload().get(key).cloned().unwrap_or_default();

    let response = ListingResponse::Failed {
        status: "error",
        error: error_message(&outcome),
        successful_marketplaces: field(keys::SUCCESSFUL),
        failed_marketplaces: field(keys::FAILED),
        recoverable: outcome.meta_flag(keys::RECOVERABLE_FAILURES),
    };
    (status, Json(response))
}

fn error_message(outcome: &Outcome) -> String {
    outcome.error_message().unwrap_or_default().to_string()
}
