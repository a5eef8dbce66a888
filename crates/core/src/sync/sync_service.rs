use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};

use adpulse_platforms::{
    AdPlatformClient, ClientFactory, DateRange, PlatformError, TokenSet,
};

use crate::campaigns::CampaignRepositoryTrait;
use crate::connections::{AdConnection, AdConnectionRepositoryTrait, SyncStatus, TokenUpdate};
use crate::credentials::CredentialsServiceTrait;
use crate::errors::{Error, Result};

use super::sync_model::{SyncConfig, SyncOptions, SyncResult};
use super::sync_traits::SyncServiceTrait;

/// Orchestrates sync runs across connections, companies, and the whole
/// installation.
///
/// Holds no per-run state; every run reads the connection registry
/// fresh, so concurrent triggers at worst repeat idempotent work.
pub struct SyncService {
    connections: Arc<dyn AdConnectionRepositoryTrait>,
    campaigns: Arc<dyn CampaignRepositoryTrait>,
    credentials: Arc<dyn CredentialsServiceTrait>,
    client_factory: Arc<dyn ClientFactory>,
    config: SyncConfig,
}

impl SyncService {
    pub fn new(
        connections: Arc<dyn AdConnectionRepositoryTrait>,
        campaigns: Arc<dyn CampaignRepositoryTrait>,
        credentials: Arc<dyn CredentialsServiceTrait>,
        client_factory: Arc<dyn ClientFactory>,
        config: SyncConfig,
    ) -> Self {
        Self {
            connections,
            campaigns,
            credentials,
            client_factory,
            config,
        }
    }

    /// The fallible inner body of a connection sync; `sync_connection`
    /// folds its error into the result and the connection status.
    async fn run_connection_sync(
        &self,
        connection: &AdConnection,
        options: &SyncOptions,
    ) -> Result<SyncResult> {
        let app_config = self
            .credentials
            .resolve_app_config(&connection.company_id, connection.platform)
            .await?;
        let client = self.client_factory.client_for(connection.platform, &app_config)?;

        let access_token = self
            .ensure_fresh_token(connection, client.as_ref(), options.force_refresh)
            .await?;

        let range = DateRange::last_days(options.days_back);

        let campaigns = client
            .list_campaigns(&access_token, &connection.external_account_id)
            .await?;
        let campaigns_synced = self
            .campaigns
            .upsert_campaigns(
                &connection.company_id,
                &connection.id,
                connection.platform,
                campaigns,
            )
            .await?;

        let metrics = client
            .list_metrics(&access_token, &connection.external_account_id, range)
            .await?;
        let metrics_synced = self
            .campaigns
            .upsert_metrics(
                &connection.company_id,
                &connection.id,
                connection.platform,
                metrics,
            )
            .await?;

        let creatives_synced = match client
            .list_creatives(&access_token, &connection.external_account_id)
            .await
        {
            Ok(creatives) => {
                self.campaigns
                    .upsert_creatives(
                        &connection.company_id,
                        &connection.id,
                        connection.platform,
                        creatives,
                    )
                    .await?
            }
            Err(PlatformError::NotSupported { .. }) => {
                debug!(
                    "[{}] creatives not supported, skipping for connection {}",
                    connection.platform, connection.id
                );
                0
            }
            Err(e) => return Err(e.into()),
        };

        Ok(SyncResult {
            connection_id: connection.id.clone(),
            platform: connection.platform,
            account_id: connection.external_account_id.clone(),
            success: true,
            error: None,
            campaigns_synced,
            metrics_synced,
            creatives_synced,
        })
    }

    /// Return a usable access token, refreshing and persisting new token
    /// material first when the current one is expired or about to be.
    async fn ensure_fresh_token(
        &self,
        connection: &AdConnection,
        client: &dyn AdPlatformClient,
        force_refresh: bool,
    ) -> Result<String> {
        let wants_refresh = force_refresh || connection.needs_token_refresh();
        if !wants_refresh || connection.platform.has_non_expiring_tokens() {
            return Ok(connection.access_token.clone());
        }

        let refresh_token = connection.refresh_token.as_deref().ok_or_else(|| {
            Error::Unexpected(format!(
                "Connection {} has an expiring token but no refresh token",
                connection.id
            ))
        })?;

        debug!(
            "[{}] refreshing access token for connection {}",
            connection.platform, connection.id
        );
        let tokens = client.refresh_token(refresh_token).await?;
        let update = token_update_from(&tokens, connection.refresh_token.clone());
        let updated = self.connections.update_tokens(&connection.id, update).await?;
        Ok(updated.access_token)
    }

    /// Record a failure on the connection and fold it into a result.
    async fn fail_connection(&self, connection: &AdConnection, err: Error) -> SyncResult {
        let message = err.to_string();
        error!(
            "[{}] sync failed for connection {}: {}",
            connection.platform, connection.id, message
        );
        if let Err(status_err) = self
            .connections
            .set_status(&connection.id, SyncStatus::Error, Some(message.clone()))
            .await
        {
            error!(
                "Failed to record error status for connection {}: {}",
                connection.id, status_err
            );
        }
        SyncResult::failed(
            &connection.id,
            connection.platform,
            &connection.external_account_id,
            message,
        )
    }
}

/// Map freshly issued tokens to a registry update, keeping the old
/// refresh token when the platform does not rotate it.
fn token_update_from(tokens: &TokenSet, previous_refresh: Option<String>) -> TokenUpdate {
    TokenUpdate {
        access_token: tokens.access_token.clone(),
        refresh_token: tokens.refresh_token.clone().or(previous_refresh),
        token_expires_at: tokens
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs)),
    }
}

#[async_trait]
impl SyncServiceTrait for SyncService {
    async fn sync_connection(
        &self,
        connection: &AdConnection,
        options: &SyncOptions,
    ) -> SyncResult {
        info!(
            "[{}] syncing connection {} (account {})",
            connection.platform, connection.id, connection.external_account_id
        );

        if let Err(e) = self
            .connections
            .set_status(&connection.id, SyncStatus::Syncing, None)
            .await
        {
            return self.fail_connection(connection, e).await;
        }

        match self.run_connection_sync(connection, options).await {
            Ok(result) => {
                if let Err(e) = self
                    .connections
                    .set_status(&connection.id, SyncStatus::Healthy, None)
                    .await
                {
                    return self.fail_connection(connection, e).await;
                }
                info!(
                    "[{}] connection {} synced: {} campaigns, {} metrics",
                    connection.platform,
                    connection.id,
                    result.campaigns_synced,
                    result.metrics_synced
                );
                result
            }
            Err(e) => self.fail_connection(connection, e).await,
        }
    }

    async fn sync_company(
        &self,
        company_id: &str,
        options: &SyncOptions,
    ) -> Result<Vec<SyncResult>> {
        let connections = self
            .connections
            .list_for_company(company_id, options.platform)
            .await?;
        info!(
            "Syncing company {}: {} connection(s)",
            company_id,
            connections.len()
        );

        let mut results = Vec::with_capacity(connections.len());
        for connection in &connections {
            results.push(self.sync_connection(connection, options).await);
        }
        Ok(results)
    }

    async fn sync_all_companies(&self, options: &SyncOptions) -> Result<Vec<SyncResult>> {
        let company_ids = self.connections.list_company_ids().await?;
        info!("Full sync sweep across {} company(ies)", company_ids.len());

        let results: Vec<Vec<SyncResult>> = stream::iter(company_ids)
            .map(|company_id| async move {
                match self.sync_company(&company_id, options).await {
                    Ok(results) => results,
                    Err(e) => {
                        warn!("Skipping company {} in sweep: {}", company_id, e);
                        Vec::new()
                    }
                }
            })
            .buffer_unordered(self.config.company_concurrency)
            .collect()
            .await;

        Ok(results.into_iter().flatten().collect())
    }
}
