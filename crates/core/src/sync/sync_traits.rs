use async_trait::async_trait;

use crate::connections::AdConnection;
use crate::errors::Result;

use super::sync_model::{SyncOptions, SyncResult};

/// Trait for the sync orchestrator.
#[async_trait]
pub trait SyncServiceTrait: Send + Sync {
    /// Sync one connection end to end.
    ///
    /// Infallible at the signature level: every failure mode is folded
    /// into the returned result and the connection's recorded status.
    async fn sync_connection(&self, connection: &AdConnection, options: &SyncOptions)
        -> SyncResult;

    /// Sync every connection of one company, sequentially.
    ///
    /// Returns exactly one result per attempted connection; a failing
    /// connection never aborts the rest.
    async fn sync_company(&self, company_id: &str, options: &SyncOptions)
        -> Result<Vec<SyncResult>>;

    /// Sync every company with at least one connection.
    async fn sync_all_companies(&self, options: &SyncOptions) -> Result<Vec<SyncResult>>;
}
