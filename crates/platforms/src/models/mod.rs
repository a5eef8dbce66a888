//! Canonical models shared by every platform client.
//!
//! Each platform module normalizes its raw payloads into these shapes
//! before returning them; nothing upstream of this crate ever sees a
//! platform-specific struct.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four supported ad platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdPlatform {
    Google,
    Meta,
    LinkedIn,
    TikTok,
}

impl AdPlatform {
    /// Stable string tag used in routes, storage and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdPlatform::Google => "google",
            AdPlatform::Meta => "meta",
            AdPlatform::LinkedIn => "linkedin",
            AdPlatform::TikTok => "tiktok",
        }
    }

    /// All platforms, in a fixed order.
    pub fn all() -> [AdPlatform; 4] {
        [
            AdPlatform::Google,
            AdPlatform::Meta,
            AdPlatform::LinkedIn,
            AdPlatform::TikTok,
        ]
    }

    /// Whether this platform issues non-expiring access tokens.
    ///
    /// Meta long-lived tokens carry no refresh flow; the sync engine skips
    /// token refresh entirely when no expiry is recorded.
    pub fn has_non_expiring_tokens(&self) -> bool {
        matches!(self, AdPlatform::Meta)
    }

    /// Name of the auth-code query parameter on the OAuth callback.
    /// TikTok deviates from the `code` convention.
    pub fn auth_code_param(&self) -> &'static str {
        match self {
            AdPlatform::TikTok => "auth_code",
            _ => "code",
        }
    }
}

impl fmt::Display for AdPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(AdPlatform::Google),
            "meta" => Ok(AdPlatform::Meta),
            "linkedin" => Ok(AdPlatform::LinkedIn),
            "tiktok" => Ok(AdPlatform::TikTok),
            other => Err(format!("Unknown ad platform: {}", other)),
        }
    }
}

/// Per-company OAuth application material handed to a platform client.
#[derive(Debug, Clone)]
pub struct PlatformAppConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Google Ads requires a developer token header on every API call.
    pub developer_token: Option<String>,
    pub redirect_uri: String,
}

/// Tokens returned by a code exchange or a refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Seconds until expiry. `None` means the token does not expire.
    pub expires_in: Option<i64>,
}

/// An ad account reachable by a token, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdAccount {
    pub id: String,
    pub name: String,
    /// Platform-reported status literal, untranslated.
    pub status: Option<String>,
}

/// Status literals the platforms use for an account that can serve ads.
const ACTIVE_ACCOUNT_LITERALS: &[&str] = &["active", "enabled", "enable", "status_enable", "1"];

/// Pick the account to connect when an exchange reaches several.
///
/// Prefers the first account whose platform-reported status is active;
/// otherwise falls back to the first account in platform order, so the
/// choice is reproducible given identical upstream data.
pub fn select_account(accounts: &[AdAccount]) -> Option<&AdAccount> {
    accounts
        .iter()
        .find(|account| {
            account
                .status
                .as_deref()
                .map(|s| ACTIVE_ACCOUNT_LITERALS.contains(&s.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .or_else(|| accounts.first())
}

/// Canonical campaign status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Paused,
    Ended,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Ended => "ended",
        }
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "ended" => Ok(CampaignStatus::Ended),
            other => Err(format!("Unknown campaign status: {}", other)),
        }
    }
}

/// Canonical campaign record.
///
/// `external_id` is the idempotency key: persisting the same campaign
/// twice overwrites, never duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub external_id: String,
    pub name: String,
    pub status: CampaignStatus,
    /// Daily budget in whole currency units.
    pub budget_daily: Decimal,
}

/// Canonical per-day metrics record.
///
/// Idempotency key is (campaign_external_id, date); a later sync for the
/// same day overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    pub campaign_external_id: String,
    pub date: NaiveDate,
    pub impressions: i64,
    pub clicks: i64,
    /// Spend in whole currency units (micros and cents already divided out).
    pub spend: Decimal,
    pub revenue: Decimal,
}

/// Canonical creative record. Only Meta exposes creatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creative {
    pub external_id: String,
    pub campaign_external_id: Option<String>,
    pub name: String,
    pub status: CampaignStatus,
}

/// Inclusive date range for metrics queries, always day-granular.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The last `days` days ending today (UTC).
    pub fn last_days(days: i64) -> Self {
        let end = Utc::now().date_naive();
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    /// Clamp the start so the range spans at most `max_days` before `end`.
    pub fn clamp_lookback(self, max_days: i64) -> Self {
        let floor = self.end - Duration::days(max_days);
        if self.start < floor {
            Self {
                start: floor,
                end: self.end,
            }
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, status: Option<&str>) -> AdAccount {
        AdAccount {
            id: id.to_string(),
            name: format!("Account {}", id),
            status: status.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_platform_round_trip() {
        for platform in AdPlatform::all() {
            assert_eq!(platform.as_str().parse::<AdPlatform>(), Ok(platform));
        }
        assert!("snapchat".parse::<AdPlatform>().is_err());
    }

    #[test]
    fn test_select_account_prefers_active() {
        let accounts = vec![
            account("1", Some("PAUSED")),
            account("2", Some("ACTIVE")),
            account("3", Some("ACTIVE")),
        ];
        assert_eq!(select_account(&accounts).unwrap().id, "2");
    }

    #[test]
    fn test_select_account_falls_back_to_first() {
        let accounts = vec![
            account("1", Some("DISABLED")),
            account("2", None),
            account("3", Some("REMOVED")),
        ];
        // No active account: always the first element, across repeated calls.
        for _ in 0..3 {
            assert_eq!(select_account(&accounts).unwrap().id, "1");
        }
    }

    #[test]
    fn test_select_account_handles_platform_literals() {
        let accounts = vec![
            account("1", Some("DISABLE")),
            account("2", Some("STATUS_ENABLE")),
        ];
        assert_eq!(select_account(&accounts).unwrap().id, "2");
    }

    #[test]
    fn test_select_account_empty() {
        assert!(select_account(&[]).is_none());
    }

    #[test]
    fn test_clamp_lookback() {
        let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let range = DateRange::new(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), end);
        let clamped = range.clamp_lookback(365);
        assert_eq!(clamped.end, end);
        assert_eq!(clamped.start, end - Duration::days(365));

        let short = DateRange::new(end - Duration::days(7), end);
        assert_eq!(short.clamp_lookback(365), short);
    }

    #[test]
    fn test_auth_code_param() {
        assert_eq!(AdPlatform::Google.auth_code_param(), "code");
        assert_eq!(AdPlatform::TikTok.auth_code_param(), "auth_code");
    }
}
