use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use adpulse_core::auth_flow::StateTokenCodec;
use adpulse_core::connections::{AdConnectionRepositoryTrait, ConnectionsService};
use adpulse_core::credentials::{CredentialsService, CredentialsServiceTrait};
use adpulse_core::recommendations::{RecommendationService, RecommendationServiceTrait};
use adpulse_core::sync::{SyncConfig, SyncService, SyncServiceTrait};
use adpulse_platforms::{ClientFactory, DefaultClientFactory};
use adpulse_storage_sqlite::campaigns::CampaignRepository;
use adpulse_storage_sqlite::connections::AdConnectionRepository;
use adpulse_storage_sqlite::credentials::CompanyOAuthAppRepository;
use adpulse_storage_sqlite::db;
use adpulse_storage_sqlite::recommendations::RecommendationRepository;

use crate::config::Config;

pub struct AppState {
    pub app_url: String,
    pub auth_secret: String,
    pub cron_secret: Option<String>,
    pub webhook_secret: Option<String>,
    pub sync_interval_secs: u64,
    pub sync_days_back: i64,
    pub state_codec: StateTokenCodec,
    pub client_factory: Arc<dyn ClientFactory>,
    pub credentials_service: Arc<dyn CredentialsServiceTrait>,
    pub connections_service: Arc<ConnectionsService>,
    pub connection_repository: Arc<dyn AdConnectionRepositoryTrait>,
    pub recommendation_service: Arc<dyn RecommendationServiceTrait>,
    pub sync_service: Arc<dyn SyncServiceTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("ADP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let (pool, writer) = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);

    let oauth_app_repository = Arc::new(CompanyOAuthAppRepository::new(
        pool.clone(),
        writer.clone(),
    ));
    let connection_repository = Arc::new(AdConnectionRepository::new(pool.clone(), writer.clone()));
    let campaign_repository = Arc::new(CampaignRepository::new(pool.clone(), writer.clone()));
    let recommendation_repository =
        Arc::new(RecommendationRepository::new(pool.clone(), writer.clone()));

    let credentials_service: Arc<dyn CredentialsServiceTrait> =
        Arc::new(CredentialsService::new(oauth_app_repository));
    let connections_service = Arc::new(ConnectionsService::new(connection_repository.clone()));
    let recommendation_service: Arc<dyn RecommendationServiceTrait> =
        Arc::new(RecommendationService::new(recommendation_repository));
    let client_factory: Arc<dyn ClientFactory> = Arc::new(DefaultClientFactory);

    let sync_service: Arc<dyn SyncServiceTrait> = Arc::new(SyncService::new(
        connection_repository.clone(),
        campaign_repository,
        credentials_service.clone(),
        client_factory.clone(),
        SyncConfig {
            company_concurrency: config.sync_concurrency,
        },
    ));

    Ok(Arc::new(AppState {
        app_url: config.app_url.clone(),
        auth_secret: config.auth_secret.clone(),
        cron_secret: config.cron_secret.clone(),
        webhook_secret: config.webhook_secret.clone(),
        sync_interval_secs: config.sync_interval_secs,
        sync_days_back: config.sync_days_back,
        state_codec: StateTokenCodec::new(config.auth_secret.as_bytes()),
        client_factory,
        credentials_service,
        connections_service,
        connection_repository,
        recommendation_service,
        sync_service,
    }))
}
