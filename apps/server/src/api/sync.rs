//! Sync trigger routes: manual (dashboard) and cron (scheduler service).

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use adpulse_core::connections::AdConnectionRepositoryTrait;
use adpulse_core::sync::{SyncOptions, SyncResult, SyncServiceTrait, SyncSummary};
use adpulse_platforms::AdPlatform;

use crate::auth::AuthedUser;
use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ManualSyncRequest {
    connection_id: Option<String>,
    platform: Option<AdPlatform>,
    days_back: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncResponse {
    #[serde(flatten)]
    summary: SyncSummary,
    results: Vec<SyncResult>,
}

impl SyncResponse {
    fn from_results(results: Vec<SyncResult>) -> Self {
        Self {
            summary: SyncSummary::from_results(&results),
            results,
        }
    }
}

/// Trigger a sync for the caller's company, optionally narrowed to one
/// connection or one platform.
async fn manual_sync(
    State(state): State<Arc<AppState>>,
    user: AuthedUser,
    body: Option<Json<ManualSyncRequest>>,
) -> ApiResult<Json<SyncResponse>> {
    let Json(request) = body.unwrap_or_default();
    let options = SyncOptions {
        days_back: request.days_back.unwrap_or(state.sync_days_back),
        platform: request.platform,
        force_refresh: false,
    };

    info!(
        "Manual sync requested by user {} for company {}",
        user.user_id, user.company_id
    );

    let results = match request.connection_id {
        Some(connection_id) => {
            let connection = state.connection_repository.get_by_id(&connection_id).await?;
            if connection.company_id != user.company_id {
                return Err(ApiError::NotFound(connection_id));
            }
            vec![state.sync_service.sync_connection(&connection, &options).await]
        }
        None => {
            state
                .sync_service
                .sync_company(&user.company_id, &options)
                .await?
        }
    };

    Ok(Json(SyncResponse::from_results(results)))
}

#[derive(Debug, Deserialize)]
struct CronQuery {
    scope: Option<String>,
}

/// Scheduled trigger. Authorized by the shared cron secret, or by an
/// admin bearer token.
async fn cron_sync(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CronQuery>,
    user: Option<AuthedUser>,
) -> ApiResult<Json<SyncResponse>> {
    let secret_ok = match (&state.cron_secret, headers.get("x-cron-secret")) {
        (Some(expected), Some(provided)) => provided.as_bytes() == expected.as_bytes(),
        _ => false,
    };
    let admin = user.as_ref().filter(|u| u.is_admin());
    if !secret_ok && admin.is_none() {
        return Err(ApiError::Unauthorized);
    }

    let options = SyncOptions {
        days_back: state.sync_days_back,
        ..Default::default()
    };

    let results = match query.scope.as_deref() {
        Some("company") => {
            let admin = admin.ok_or(ApiError::Unauthorized)?;
            state
                .sync_service
                .sync_company(&admin.company_id, &options)
                .await?
        }
        None | Some("all") => state.sync_service.sync_all_companies(&options).await?,
        Some(other) => {
            return Err(ApiError::BadRequest(format!("unknown scope: {}", other)));
        }
    };

    Ok(Json(SyncResponse::from_results(results)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync/manual", post(manual_sync))
        .route("/cron/sync-metrics", get(cron_sync))
}
