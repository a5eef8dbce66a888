use async_trait::async_trait;
use chrono::NaiveDate;

use adpulse_platforms::{AdPlatform, Campaign, Creative, MetricsRecord};

use crate::errors::Result;

use super::campaigns_model::{StoredCampaign, StoredCreative, StoredMetricsRecord};

/// Filter for reading back stored metrics.
#[derive(Debug, Clone, Default)]
pub struct MetricsQuery {
    pub campaign_external_id: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Trait for campaign, metrics, and creative persistence.
///
/// All writes are upserts keyed on the natural identity of the record,
/// so re-syncing the same window is idempotent.
#[async_trait]
pub trait CampaignRepositoryTrait: Send + Sync {
    async fn upsert_campaigns(
        &self,
        company_id: &str,
        connection_id: &str,
        platform: AdPlatform,
        campaigns: Vec<Campaign>,
    ) -> Result<usize>;

    async fn upsert_metrics(
        &self,
        company_id: &str,
        connection_id: &str,
        platform: AdPlatform,
        records: Vec<MetricsRecord>,
    ) -> Result<usize>;

    async fn upsert_creatives(
        &self,
        company_id: &str,
        connection_id: &str,
        platform: AdPlatform,
        creatives: Vec<Creative>,
    ) -> Result<usize>;

    async fn list_campaigns(&self, company_id: &str) -> Result<Vec<StoredCampaign>>;

    async fn list_metrics(
        &self,
        company_id: &str,
        query: MetricsQuery,
    ) -> Result<Vec<StoredMetricsRecord>>;

    async fn list_creatives(&self, company_id: &str) -> Result<Vec<StoredCreative>>;
}
