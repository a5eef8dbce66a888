//! Pure mapping from Google Ads GAQL rows into canonical records.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::PlatformError;
use crate::models::{AdPlatform, Campaign, CampaignStatus, MetricsRecord};

use super::SearchRow;

const PLATFORM: AdPlatform = AdPlatform::Google;

/// Map a Google campaign status literal onto the canonical enum.
///
/// Exhaustive over the documented values; anything Google adds later is
/// treated as paused so ingestion never breaks on a new enum value.
pub(super) fn map_status(status: &str) -> CampaignStatus {
    match status {
        "ENABLED" => CampaignStatus::Active,
        "PAUSED" => CampaignStatus::Paused,
        "REMOVED" => CampaignStatus::Ended,
        _ => CampaignStatus::Paused,
    }
}

/// Divide a fixed-point micros value down to whole currency units.
pub(super) fn micros_to_decimal(micros: i64) -> Decimal {
    Decimal::new(micros, 6).normalize()
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

pub(super) fn campaign(row: &SearchRow) -> Result<Campaign, PlatformError> {
    let raw = row
        .campaign
        .as_ref()
        .ok_or_else(|| PlatformError::Normalization {
            platform: PLATFORM,
            message: "search row missing campaign".to_string(),
        })?;
    let external_id = raw.id.clone().ok_or_else(|| PlatformError::Normalization {
        platform: PLATFORM,
        message: "campaign missing id".to_string(),
    })?;

    let budget_micros = parse_i64(
        row.campaign_budget
            .as_ref()
            .and_then(|b| b.amount_micros.as_deref()),
        "campaign_budget.amount_micros",
    )?;

    Ok(Campaign {
        external_id,
        name: raw.name.clone().unwrap_or_default(),
        status: map_status(raw.status.as_deref().unwrap_or_default()),
        budget_daily: micros_to_decimal(budget_micros),
    })
}

pub(super) fn metric(row: &SearchRow) -> Result<MetricsRecord, PlatformError> {
    let campaign_external_id = row
        .campaign
        .as_ref()
        .and_then(|c| c.id.clone())
        .ok_or_else(|| PlatformError::Normalization {
            platform: PLATFORM,
            message: "metrics row missing campaign id".to_string(),
        })?;
    let date_str = row
        .segments
        .as_ref()
        .and_then(|s| s.date.as_deref())
        .ok_or_else(|| PlatformError::Normalization {
            platform: PLATFORM,
            message: "metrics row missing segments.date".to_string(),
        })?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        PlatformError::Normalization {
            platform: PLATFORM,
            message: format!("invalid segments.date: {}", e),
        }
    })?;

    let metrics = row.metrics.as_ref();
    let impressions = parse_i64(
        metrics.and_then(|m| m.impressions.as_deref()),
        "metrics.impressions",
    )?;
    let clicks = parse_i64(metrics.and_then(|m| m.clicks.as_deref()), "metrics.clicks")?;
    let cost_micros = parse_i64(
        metrics.and_then(|m| m.cost_micros.as_deref()),
        "metrics.cost_micros",
    )?;
    let revenue = metrics
        .and_then(|m| m.conversions_value)
        .and_then(Decimal::from_f64_retain)
        .unwrap_or_default();

    Ok(MetricsRecord {
        campaign_external_id,
        date,
        impressions,
        clicks,
        spend: micros_to_decimal(cost_micros),
        revenue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(json: serde_json::Value) -> SearchRow {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_status_mapping_is_exhaustive() {
        assert_eq!(map_status("ENABLED"), CampaignStatus::Active);
        assert_eq!(map_status("PAUSED"), CampaignStatus::Paused);
        assert_eq!(map_status("REMOVED"), CampaignStatus::Ended);
        // New upstream values must not break ingestion.
        assert_eq!(map_status("UNKNOWN"), CampaignStatus::Paused);
        assert_eq!(map_status("EXPERIMENTAL"), CampaignStatus::Paused);
    }

    #[test]
    fn test_micros_division() {
        assert_eq!(micros_to_decimal(25_000_000), dec!(25));
        assert_eq!(micros_to_decimal(1_234_567), dec!(1.234567));
        assert_eq!(micros_to_decimal(0), dec!(0));
    }

    #[test]
    fn test_campaign_normalization() {
        let campaign = campaign(&row(serde_json::json!({
            "campaign": { "id": "111", "name": "Brand", "status": "ENABLED" },
            "campaignBudget": { "amountMicros": "50000000" }
        })))
        .unwrap();
        assert_eq!(campaign.external_id, "111");
        assert_eq!(campaign.status, CampaignStatus::Active);
        assert_eq!(campaign.budget_daily, dec!(50));
    }

    #[test]
    fn test_campaign_missing_id_fails() {
        let result = campaign(&row(serde_json::json!({
            "campaign": { "name": "Brand", "status": "ENABLED" }
        })));
        assert!(matches!(
            result,
            Err(PlatformError::Normalization { .. })
        ));
    }

    #[test]
    fn test_metric_normalization() {
        let metric = metric(&row(serde_json::json!({
            "campaign": { "id": "111" },
            "segments": { "date": "2025-06-01" },
            "metrics": {
                "impressions": "1200",
                "clicks": "34",
                "costMicros": "12500000",
                "conversionsValue": 99.5
            }
        })))
        .unwrap();
        assert_eq!(metric.campaign_external_id, "111");
        assert_eq!(metric.date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(metric.impressions, 1200);
        assert_eq!(metric.clicks, 34);
        assert_eq!(metric.spend, dec!(12.5));
        assert_eq!(metric.revenue, dec!(99.5));
    }
}
