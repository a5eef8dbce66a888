use async_trait::async_trait;

use adpulse_platforms::AdPlatform;

use crate::errors::Result;

use super::connections_model::{AdConnection, NewAdConnection, SyncStatus, TokenUpdate};

/// Trait for connection persistence.
#[async_trait]
pub trait AdConnectionRepositoryTrait: Send + Sync {
    async fn get_by_id(&self, connection_id: &str) -> Result<AdConnection>;

    async fn list_for_company(
        &self,
        company_id: &str,
        platform: Option<AdPlatform>,
    ) -> Result<Vec<AdConnection>>;

    /// Distinct ids of companies holding at least one connection, for
    /// scheduled sweeps.
    async fn list_company_ids(&self) -> Result<Vec<String>>;

    /// Insert or replace the connection keyed on
    /// (company, platform, account), refreshing tokens on conflict.
    async fn create(&self, new_connection: NewAdConnection) -> Result<AdConnection>;

    async fn update_tokens(&self, connection_id: &str, tokens: TokenUpdate)
        -> Result<AdConnection>;

    /// Move the connection through the sync-health lifecycle.
    ///
    /// `Syncing` stamps `last_sync_at`; `Healthy` clears `sync_error`;
    /// `Error` records the message passed in `error`.
    async fn set_status(
        &self,
        connection_id: &str,
        status: SyncStatus,
        error: Option<String>,
    ) -> Result<AdConnection>;

    async fn delete(&self, connection_id: &str) -> Result<()>;
}

/// Trait for connection lifecycle operations.
#[async_trait]
pub trait ConnectionsServiceTrait: Send + Sync {
    async fn establish(&self, new_connection: NewAdConnection) -> Result<AdConnection>;

    async fn get_connection(&self, connection_id: &str) -> Result<AdConnection>;

    async fn list_connections(
        &self,
        company_id: &str,
        platform: Option<AdPlatform>,
    ) -> Result<Vec<AdConnection>>;

    async fn disconnect(&self, connection_id: &str) -> Result<()>;
}
