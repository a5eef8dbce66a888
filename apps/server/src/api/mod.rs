//! HTTP routes.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::main_lib::AppState;

pub mod health;
pub mod integrations;
pub mod sync;
pub mod webhooks;

pub fn app_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(health::router())
        .merge(integrations::router())
        .merge(sync::router())
        .merge(webhooks::router());

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(60)))
        .with_state(state)
}
