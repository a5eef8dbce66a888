//! Inbound webhook from the automation pipeline.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use adpulse_core::recommendations::{ExecutionUpdate, RecommendationServiceTrait};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecutionReport {
    recommendation_id: String,
    status: String,
    output: Option<String>,
    error: Option<String>,
}

/// Record the execution outcome of a recommendation.
async fn n8n_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(report): Json<ExecutionReport>,
) -> ApiResult<Json<Value>> {
    let authorized = match (&state.webhook_secret, headers.get("x-webhook-secret")) {
        (Some(expected), Some(provided)) => provided.as_bytes() == expected.as_bytes(),
        _ => false,
    };
    if !authorized {
        return Err(ApiError::Unauthorized);
    }

    let updated = state
        .recommendation_service
        .record_execution(
            &report.recommendation_id,
            ExecutionUpdate {
                status: report.status,
                output: report.output,
                error: report.error,
            },
        )
        .await?;

    Ok(Json(json!({ "id": updated.id, "executionStatus": updated.execution_status })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/webhooks/n8n", post(n8n_webhook))
}
