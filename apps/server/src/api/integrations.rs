//! OAuth integration routes: authorize redirect and provider callback.
//!
//! The callback is browser-facing; it never returns JSON. Every outcome
//! is a redirect back to the dashboard integrations page, carrying
//! either `connected={account}` or `error={reason}`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use chrono::{Duration, Utc};
use tracing::{info, warn};

use adpulse_core::auth_flow::AuthFlowState;
use adpulse_core::connections::{ConnectionsServiceTrait, NewAdConnection};
use adpulse_core::credentials::CredentialsServiceTrait;
use adpulse_platforms::{select_account, AdPlatform, AdPlatformClient, ClientFactory};

use crate::auth::AuthedUser;
use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

fn dashboard_error(state: &AppState, reason: &str) -> Redirect {
    Redirect::temporary(&format!(
        "{}/dashboard/integrations?error={}",
        state.app_url, reason
    ))
}

/// Start the OAuth flow: 302 to the platform's authorize URL with the
/// signed state token embedded.
async fn authorize(
    State(state): State<Arc<AppState>>,
    Path(platform): Path<String>,
    user: AuthedUser,
) -> ApiResult<Redirect> {
    let platform: AdPlatform = platform
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown platform: {}", platform)))?;

    let app_config = state
        .credentials_service
        .resolve_app_config(&user.company_id, platform)
        .await?;
    let client = state
        .client_factory
        .client_for(platform, &app_config)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let flow_state = AuthFlowState::new(&user.company_id, &user.user_id, platform);
    let token = state.state_codec.encode(&flow_state)?;

    info!(
        "Starting {} OAuth flow for company {}",
        platform, user.company_id
    );
    Ok(Redirect::temporary(&client.authorize_url(&token)))
}

/// Provider callback. Browser-facing: always redirects, never errors.
async fn callback(
    State(state): State<Arc<AppState>>,
    Path(platform): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Redirect {
    let Ok(platform) = platform.parse::<AdPlatform>() else {
        return dashboard_error(&state, "missing_params");
    };

    let code = params.get(platform.auth_code_param());
    let state_token = params.get("state");
    let (Some(code), Some(state_token)) = (code, state_token) else {
        return dashboard_error(&state, "missing_params");
    };

    let Some(flow_state) = state.state_codec.decode(state_token) else {
        return dashboard_error(&state, "invalid_state");
    };
    if !state.state_codec.validate(&flow_state, platform) {
        return dashboard_error(&state, "invalid_state");
    }

    let app_config = match state
        .credentials_service
        .resolve_app_config(&flow_state.company_id, platform)
        .await
    {
        Ok(config) => config,
        Err(adpulse_core::Error::CredentialsMissing { .. }) => {
            return dashboard_error(&state, "credentials_missing");
        }
        Err(e) => {
            warn!("[{}] callback failed resolving credentials: {}", platform, e);
            return dashboard_error(&state, "connection_failed");
        }
    };

    let client = match state.client_factory.client_for(platform, &app_config) {
        Ok(client) => client,
        Err(e) => {
            warn!("[{}] callback failed building client: {}", platform, e);
            return dashboard_error(&state, "connection_failed");
        }
    };

    let tokens = match client.exchange_code(code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!("[{}] code exchange failed: {}", platform, e);
            return dashboard_error(&state, "exchange_failed");
        }
    };

    let accounts = match client.list_accounts(&tokens.access_token).await {
        Ok(accounts) => accounts,
        Err(e) => {
            warn!("[{}] account listing failed: {}", platform, e);
            return dashboard_error(&state, "connection_failed");
        }
    };
    let Some(account) = select_account(&accounts) else {
        return dashboard_error(&state, "no_accounts");
    };

    let new_connection = NewAdConnection {
        company_id: flow_state.company_id.clone(),
        platform,
        external_account_id: account.id.clone(),
        account_name: account.name.clone(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_expires_at: tokens
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs)),
    };
    if let Err(e) = state.connections_service.establish(new_connection).await {
        warn!("[{}] failed to persist connection: {}", platform, e);
        return dashboard_error(&state, "connection_failed");
    }

    Redirect::temporary(&format!(
        "{}/dashboard/integrations?connected={}",
        state.app_url,
        urlencoding::encode(&account.name)
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/integrations/{platform}", get(authorize))
        .route("/integrations/callback/{platform}", get(callback))
}
