//! Pure mapping from Meta Graph API payloads into canonical records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::PlatformError;
use crate::models::{AdAccount, AdPlatform, Campaign, CampaignStatus, Creative, MetricsRecord};

use super::{RawAdAccount, RawCampaign, RawCreative, RawInsightsRow};

const PLATFORM: AdPlatform = AdPlatform::Meta;

pub(super) fn map_status(status: &str) -> CampaignStatus {
    match status {
        "ACTIVE" => CampaignStatus::Active,
        "PAUSED" => CampaignStatus::Paused,
        "ARCHIVED" | "DELETED" => CampaignStatus::Ended,
        _ => CampaignStatus::Paused,
    }
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal, PlatformError> {
    Decimal::from_str(value).map_err(|e| PlatformError::Normalization {
        platform: PLATFORM,
        message: format!("invalid {}: {}", field, e),
    })
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

pub(super) fn account(raw: RawAdAccount) -> AdAccount {
    let status = raw.account_status.map(|code| {
        if code == 1 {
            "ACTIVE".to_string()
        } else {
            "DISABLED".to_string()
        }
    });
    AdAccount {
        name: raw.name.unwrap_or_else(|| raw.id.clone()),
        id: raw.id,
        status,
    }
}

pub(super) fn campaign(raw: &RawCampaign) -> Result<Campaign, PlatformError> {
    // daily_budget is in minor units (cents).
    let budget_daily = match raw.daily_budget.as_deref() {
        Some(cents) => (parse_decimal(cents, "daily_budget")? / Decimal::from(100)).normalize(),
        None => Decimal::ZERO,
    };

    Ok(Campaign {
        external_id: raw.id.clone(),
        name: raw.name.clone().unwrap_or_default(),
        status: map_status(raw.status.as_deref().unwrap_or_default()),
        budget_daily,
    })
}

pub(super) fn metric(raw: &RawInsightsRow) -> Result<MetricsRecord, PlatformError> {
    let campaign_external_id =
        raw.campaign_id
            .clone()
            .ok_or_else(|| PlatformError::Normalization {
                platform: PLATFORM,
                message: "insights row missing campaign_id".to_string(),
            })?;
    let date_str = raw
        .date_start
        .as_deref()
        .ok_or_else(|| PlatformError::Normalization {
            platform: PLATFORM,
            message: "insights row missing date_start".to_string(),
        })?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        PlatformError::Normalization {
            platform: PLATFORM,
            message: format!("invalid date_start: {}", e),
        }
    })?;

    let spend = match raw.spend.as_deref() {
        Some(value) => parse_decimal(value, "spend")?,
        None => Decimal::ZERO,
    };

    // Revenue is the sum of purchase-type action values.
    let mut revenue = Decimal::ZERO;
    for action in &raw.action_values {
        let is_purchase = action
            .action_type
            .as_deref()
            .map(|t| t.contains("purchase"))
            .unwrap_or(false);
        if is_purchase {
            if let Some(value) = action.value.as_deref() {
                revenue += parse_decimal(value, "action_values.value")?;
            }
        }
    }

    Ok(MetricsRecord {
        campaign_external_id,
        date,
        impressions: parse_i64(raw.impressions.as_deref(), "impressions")?,
        clicks: parse_i64(raw.clicks.as_deref(), "clicks")?,
        spend,
        revenue,
    })
}

pub(super) fn creative(raw: RawCreative) -> Creative {
    Creative {
        external_id: raw.id,
        // Creatives hang off ads, not campaigns; the Graph edge does not
        // report a campaign id.
        campaign_external_id: None,
        name: raw.name.unwrap_or_default(),
        status: map_status(raw.status.as_deref().unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_mapping_is_exhaustive() {
        assert_eq!(map_status("ACTIVE"), CampaignStatus::Active);
        assert_eq!(map_status("PAUSED"), CampaignStatus::Paused);
        assert_eq!(map_status("ARCHIVED"), CampaignStatus::Ended);
        assert_eq!(map_status("DELETED"), CampaignStatus::Ended);
        assert_eq!(map_status("IN_PROCESS"), CampaignStatus::Paused);
    }

    #[test]
    fn test_budget_cents_division() {
        let raw = RawCampaign {
            id: "c1".to_string(),
            name: Some("Retargeting".to_string()),
            status: Some("ACTIVE".to_string()),
            daily_budget: Some("2500".to_string()),
        };
        assert_eq!(campaign(&raw).unwrap().budget_daily, dec!(25));
    }

    #[test]
    fn test_account_status_code() {
        let active = account(RawAdAccount {
            id: "act_1".to_string(),
            name: Some("Main".to_string()),
            account_status: Some(1),
        });
        assert_eq!(active.status.as_deref(), Some("ACTIVE"));

        let disabled = account(RawAdAccount {
            id: "act_2".to_string(),
            name: None,
            account_status: Some(101),
        });
        assert_eq!(disabled.status.as_deref(), Some("DISABLED"));
        assert_eq!(disabled.name, "act_2");
    }

    #[test]
    fn test_metric_purchase_revenue() {
        let raw: RawInsightsRow = serde_json::from_value(serde_json::json!({
            "campaign_id": "c1",
            "date_start": "2025-06-02",
            "impressions": "900",
            "clicks": "45",
            "spend": "12.34",
            "action_values": [
                { "action_type": "purchase", "value": "50.00" },
                { "action_type": "omni_purchase", "value": "8.25" },
                { "action_type": "lead", "value": "999.99" }
            ]
        }))
        .unwrap();
        let metric = metric(&raw).unwrap();
        assert_eq!(metric.spend, dec!(12.34));
        assert_eq!(metric.revenue, dec!(58.25));
        assert_eq!(metric.impressions, 900);
    }

    #[test]
    fn test_metric_missing_date_fails() {
        let raw: RawInsightsRow = serde_json::from_value(serde_json::json!({
            "campaign_id": "c1",
            "impressions": "1"
        }))
        .unwrap();
        assert!(matches!(
            metric(&raw),
            Err(PlatformError::Normalization { .. })
        ));
    }
}
