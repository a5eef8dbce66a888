//! Database models for campaigns, metrics records, and creatives.

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use adpulse_core::campaigns::{StoredCampaign, StoredCreative, StoredMetricsRecord};
use adpulse_core::Result;
use adpulse_platforms::{AdPlatform, Campaign, Creative, MetricsRecord};

use crate::utils::{parse_date, parse_decimal, parse_enum, parse_timestamp};

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::campaigns)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct CampaignDB {
    pub id: String,
    pub company_id: String,
    pub connection_id: String,
    pub platform: String,
    pub external_id: String,
    pub name: String,
    pub status: String,
    pub budget_daily: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CampaignDB {
    pub fn from_normalized(
        company_id: &str,
        connection_id: &str,
        platform: AdPlatform,
        campaign: Campaign,
    ) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            company_id: company_id.to_string(),
            connection_id: connection_id.to_string(),
            platform: platform.to_string(),
            external_id: campaign.external_id,
            name: campaign.name,
            status: campaign.status.as_str().to_string(),
            budget_daily: campaign.budget_daily.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn into_domain(self) -> Result<StoredCampaign> {
        Ok(StoredCampaign {
            platform: parse_enum("platform", &self.platform)?,
            status: parse_enum("status", &self.status)?,
            budget_daily: parse_decimal("budget_daily", &self.budget_daily)?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            id: self.id,
            company_id: self.company_id,
            connection_id: self.connection_id,
            external_id: self.external_id,
            name: self.name,
        })
    }
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::metrics_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecordDB {
    pub id: String,
    pub company_id: String,
    pub connection_id: String,
    pub platform: String,
    pub campaign_external_id: String,
    pub date: String,
    pub impressions: i64,
    pub clicks: i64,
    pub spend: String,
    pub revenue: String,
    pub created_at: String,
    pub updated_at: String,
}

impl MetricsRecordDB {
    pub fn from_normalized(
        company_id: &str,
        connection_id: &str,
        platform: AdPlatform,
        record: MetricsRecord,
    ) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            company_id: company_id.to_string(),
            connection_id: connection_id.to_string(),
            platform: platform.to_string(),
            campaign_external_id: record.campaign_external_id,
            date: record.date.format("%Y-%m-%d").to_string(),
            impressions: record.impressions,
            clicks: record.clicks,
            spend: record.spend.to_string(),
            revenue: record.revenue.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn into_domain(self) -> Result<StoredMetricsRecord> {
        Ok(StoredMetricsRecord {
            platform: parse_enum("platform", &self.platform)?,
            date: parse_date("date", &self.date)?,
            spend: parse_decimal("spend", &self.spend)?,
            revenue: parse_decimal("revenue", &self.revenue)?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            id: self.id,
            company_id: self.company_id,
            connection_id: self.connection_id,
            campaign_external_id: self.campaign_external_id,
            impressions: self.impressions,
            clicks: self.clicks,
        })
    }
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::creatives)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct CreativeDB {
    pub id: String,
    pub company_id: String,
    pub connection_id: String,
    pub platform: String,
    pub external_id: String,
    pub campaign_external_id: Option<String>,
    pub name: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CreativeDB {
    pub fn from_normalized(
        company_id: &str,
        connection_id: &str,
        platform: AdPlatform,
        creative: Creative,
    ) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            company_id: company_id.to_string(),
            connection_id: connection_id.to_string(),
            platform: platform.to_string(),
            external_id: creative.external_id,
            campaign_external_id: creative.campaign_external_id,
            name: creative.name,
            status: creative.status.as_str().to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn into_domain(self) -> Result<StoredCreative> {
        Ok(StoredCreative {
            platform: parse_enum("platform", &self.platform)?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            id: self.id,
            company_id: self.company_id,
            connection_id: self.connection_id,
            external_id: self.external_id,
            campaign_external_id: self.campaign_external_id,
            name: self.name,
            status: self.status,
        })
    }
}
