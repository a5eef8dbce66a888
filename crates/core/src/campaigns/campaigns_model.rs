use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use adpulse_platforms::{AdPlatform, CampaignStatus};

/// A campaign as persisted after normalization.
///
/// Identity is (company, platform, external id); repeated syncs update
/// the same row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredCampaign {
    pub id: String,
    pub company_id: String,
    pub connection_id: String,
    pub platform: AdPlatform,
    pub external_id: String,
    pub name: String,
    pub status: CampaignStatus,
    pub budget_daily: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One campaign-day of performance metrics as persisted.
///
/// Identity is (company, platform, campaign external id, date).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredMetricsRecord {
    pub id: String,
    pub company_id: String,
    pub connection_id: String,
    pub platform: AdPlatform,
    pub campaign_external_id: String,
    pub date: NaiveDate,
    pub impressions: i64,
    pub clicks: i64,
    pub spend: Decimal,
    pub revenue: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredMetricsRecord {
    /// Return on ad spend; `None` when nothing was spent.
    pub fn roas(&self) -> Option<Decimal> {
        if self.spend.is_zero() {
            None
        } else {
            Some(self.revenue / self.spend)
        }
    }
}

/// An ad creative as persisted, for the platforms that expose them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredCreative {
    pub id: String,
    pub company_id: String,
    pub connection_id: String,
    pub platform: AdPlatform,
    pub external_id: String,
    pub campaign_external_id: Option<String>,
    pub name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
