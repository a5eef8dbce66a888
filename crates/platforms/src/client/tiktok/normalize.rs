//! Pure mapping from TikTok Business API payloads into canonical records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::PlatformError;
use crate::models::{AdAccount, AdPlatform, Campaign, CampaignStatus, MetricsRecord};

use super::{RawAdvertiser, RawCampaign, RawReportRow};

const PLATFORM: AdPlatform = AdPlatform::TikTok;

pub(super) fn map_status(status: &str) -> CampaignStatus {
    match status {
        "ENABLE" => CampaignStatus::Active,
        "DISABLE" => CampaignStatus::Paused,
        "DELETE" => CampaignStatus::Ended,
        _ => CampaignStatus::Paused,
    }
}

/// TikTok sends ids inconsistently as JSON strings or numbers.
fn id_to_string(value: &serde_json::Value, field: &str) -> Result<String, PlatformError> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(PlatformError::Normalization {
            platform: PLATFORM,
            message: format!("invalid {}: {}", field, value),
        }),
    }
}

fn parse_decimal(value: Option<&str>, field: &str) -> Result<Decimal, PlatformError> {
    match value {
        Some(v) => Decimal::from_str(v).map_err(|e| PlatformError::Normalization {
            platform: PLATFORM,
            message: format!("invalid {}: {}", field, e),
        }),
        None => Ok(Decimal::ZERO),
    }
}

fn parse_i64(value: Option<&str>, field: &str) -> Result<i64, PlatformError> {
    value
        .unwrap_or("0")
        .parse::<i64>()
        .map_err(|e| PlatformError::Normalization {
            platform: PLATFORM,
            message: format!("invalid {}: {}", field, e),
        })
}

pub(super) fn account(raw: RawAdvertiser) -> Result<AdAccount, PlatformError> {
    let id = id_to_string(&raw.advertiser_id, "advertiser_id")?;
    Ok(AdAccount {
        name: raw.advertiser_name.unwrap_or_else(|| id.clone()),
        id,
        // advertiser/get does not report a status.
        status: None,
    })
}

pub(super) fn campaign(raw: &RawCampaign) -> Result<Campaign, PlatformError> {
    let budget_daily = raw
        .budget
        .and_then(Decimal::from_f64_retain)
        .unwrap_or_default()
        .normalize();

    Ok(Campaign {
        external_id: id_to_string(&raw.campaign_id, "campaign_id")?,
        name: raw.campaign_name.clone().unwrap_or_default(),
        status: map_status(raw.operation_status.as_deref().unwrap_or_default()),
        budget_daily,
    })
}

pub(super) fn metric(raw: &RawReportRow) -> Result<MetricsRecord, PlatformError> {
    let campaign_external_id = id_to_string(&raw.dimensions.campaign_id, "campaign_id")?;
    let stat_time = raw
        .dimensions
        .stat_time_day
        .as_deref()
        .ok_or_else(|| PlatformError::Normalization {
            platform: PLATFORM,
            message: "report row missing stat_time_day".to_string(),
        })?;
    // stat_time_day arrives as "YYYY-MM-DD HH:MM:SS"; only the day matters.
    let day_part = stat_time.split_whitespace().next().unwrap_or(stat_time);
    let date = NaiveDate::parse_from_str(day_part, "%Y-%m-%d").map_err(|e| {
        PlatformError::Normalization {
            platform: PLATFORM,
            message: format!("invalid stat_time_day: {}", e),
        }
    })?;

    Ok(MetricsRecord {
        campaign_external_id,
        date,
        impressions: parse_i64(raw.metrics.impressions.as_deref(), "impressions")?,
        clicks: parse_i64(raw.metrics.clicks.as_deref(), "clicks")?,
        spend: parse_decimal(raw.metrics.spend.as_deref(), "spend")?,
        revenue: parse_decimal(
            raw.metrics.total_complete_payment.as_deref(),
            "total_complete_payment",
        )?,
    })
}
