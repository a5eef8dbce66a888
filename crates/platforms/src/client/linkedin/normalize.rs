//! Pure mapping from LinkedIn Marketing API payloads into canonical records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::PlatformError;
use crate::models::{AdAccount, AdPlatform, Campaign, CampaignStatus, MetricsRecord};

use super::{RawAdAccount, RawAnalyticsRow, RawCampaign};

const PLATFORM: AdPlatform = AdPlatform::LinkedIn;
const CAMPAIGN_URN_PREFIX: &str = "urn:li:sponsoredCampaign:";

pub(super) fn map_status(status: &str) -> CampaignStatus {
    match status {
        "ACTIVE" => CampaignStatus::Active,
        "PAUSED" | "DRAFT" => CampaignStatus::Paused,
        "COMPLETED" | "CANCELED" | "ARCHIVED" => CampaignStatus::Ended,
        _ => CampaignStatus::Paused,
    }
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal, PlatformError> {
    Decimal::from_str(value).map_err(|e| PlatformError::Normalization {
        platform: PLATFORM,
        message: format!("invalid {}: {}", field, e),
    })
}

pub(super) fn account(raw: RawAdAccount) -> Result<AdAccount, PlatformError> {
    let id = raw.id.ok_or_else(|| PlatformError::Normalization {
        platform: PLATFORM,
        message: "ad account missing id".to_string(),
    })?;
    Ok(AdAccount {
        id: id.to_string(),
        name: raw.name.unwrap_or_else(|| id.to_string()),
        status: raw.status,
    })
}

pub(super) fn campaign(raw: &RawCampaign) -> Result<Campaign, PlatformError> {
    let id = raw.id.ok_or_else(|| PlatformError::Normalization {
        platform: PLATFORM,
        message: "campaign missing id".to_string(),
    })?;

    let budget_daily = match raw.daily_budget.as_ref().and_then(|m| m.amount.as_deref()) {
        Some(amount) => parse_decimal(amount, "dailyBudget.amount")?,
        None => Decimal::ZERO,
    };

    Ok(Campaign {
        external_id: id.to_string(),
        name: raw.name.clone().unwrap_or_default(),
        status: map_status(raw.status.as_deref().unwrap_or_default()),
        budget_daily,
    })
}

/// Extract the numeric campaign id from a sponsored-campaign URN.
fn campaign_id_from_urn(urn: &str) -> Option<String> {
    urn.strip_prefix(CAMPAIGN_URN_PREFIX).map(str::to_string)
}

pub(super) fn metric(raw: &RawAnalyticsRow) -> Result<MetricsRecord, PlatformError> {
    let campaign_external_id = raw
        .pivot_values
        .iter()
        .find_map(|urn| campaign_id_from_urn(urn))
        .ok_or_else(|| PlatformError::Normalization {
            platform: PLATFORM,
            message: "analytics row has no campaign pivot".to_string(),
        })?;

    let start = raw
        .date_range
        .as_ref()
        .and_then(|r| r.start.as_ref())
        .ok_or_else(|| PlatformError::Normalization {
            platform: PLATFORM,
            message: "analytics row missing dateRange.start".to_string(),
        })?;
    let date = NaiveDate::from_ymd_opt(start.year, start.month, start.day).ok_or_else(|| {
        PlatformError::Normalization {
            platform: PLATFORM,
            message: format!(
                "invalid analytics date: {}-{}-{}",
                start.year, start.month, start.day
            ),
        }
    })?;

    let spend = match raw.cost_in_local_currency.as_deref() {
        Some(value) => parse_decimal(value, "costInLocalCurrency")?,
        None => Decimal::ZERO,
    };
    let revenue = match raw.conversion_value_in_local_currency.as_deref() {
        Some(value) => parse_decimal(value, "conversionValueInLocalCurrency")?,
        None => Decimal::ZERO,
    };

    Ok(MetricsRecord {
        campaign_external_id,
        date,
        impressions: raw.impressions.unwrap_or(0),
        clicks: raw.clicks.unwrap_or(0),
        spend,
        revenue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_mapping_is_exhaustive() {
        assert_eq!(map_status("ACTIVE"), CampaignStatus::Active);
        assert_eq!(map_status("PAUSED"), CampaignStatus::Paused);
        assert_eq!(map_status("DRAFT"), CampaignStatus::Paused);
        assert_eq!(map_status("COMPLETED"), CampaignStatus::Ended);
        assert_eq!(map_status("CANCELED"), CampaignStatus::Ended);
        assert_eq!(map_status("PENDING_DELETION"), CampaignStatus::Paused);
    }

    #[test]
    fn test_campaign_money_object() {
        let raw: RawCampaign = serde_json::from_value(serde_json::json!({
            "id": 512345,
            "name": "Lead Gen Q3",
            "status": "ACTIVE",
            "dailyBudget": { "amount": "75.50", "currencyCode": "USD" }
        }))
        .unwrap();
        let campaign = campaign(&raw).unwrap();
        assert_eq!(campaign.external_id, "512345");
        assert_eq!(campaign.budget_daily, dec!(75.50));
    }

    #[test]
    fn test_metric_from_urn_and_structured_date() {
        let raw: RawAnalyticsRow = serde_json::from_value(serde_json::json!({
            "pivotValues": ["urn:li:sponsoredCampaign:98765"],
            "dateRange": { "start": { "day": 3, "month": 6, "year": 2025 } },
            "impressions": 4321,
            "clicks": 87,
            "costInLocalCurrency": "42.17",
            "conversionValueInLocalCurrency": "130.00"
        }))
        .unwrap();
        let metric = metric(&raw).unwrap();
        assert_eq!(metric.campaign_external_id, "98765");
        assert_eq!(metric.date, NaiveDate::from_ymd_opt(2025, 6, 3).unwrap());
        assert_eq!(metric.spend, dec!(42.17));
        assert_eq!(metric.revenue, dec!(130.00));
    }

    #[test]
    fn test_metric_without_campaign_pivot_fails() {
        let raw: RawAnalyticsRow = serde_json::from_value(serde_json::json!({
            "pivotValues": ["urn:li:sponsoredAccount:1"],
            "dateRange": { "start": { "day": 1, "month": 1, "year": 2025 } }
        }))
        .unwrap();
        assert!(matches!(
            metric(&raw),
            Err(PlatformError::Normalization { .. })
        ));
    }
}
