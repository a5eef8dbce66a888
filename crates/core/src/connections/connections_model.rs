use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use adpulse_platforms::AdPlatform;

/// Refresh tokens this many seconds before their recorded expiry.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Sync-health state of a connection.
///
/// Lifecycle: `Idle` on creation, `Syncing` while a run is in flight,
/// then `Healthy` or `Error` depending on the outcome. A new run always
/// starts from whatever terminal state the previous one left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Idle,
    Syncing,
    Healthy,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Healthy => "healthy",
            SyncStatus::Error => "error",
        }
    }

    /// Re-sync is always allowed, from any state.
    pub fn can_enter_syncing(&self) -> bool {
        true
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(SyncStatus::Idle),
            "syncing" => Ok(SyncStatus::Syncing),
            "healthy" => Ok(SyncStatus::Healthy),
            "error" => Ok(SyncStatus::Error),
            other => Err(format!("Unknown sync status: {}", other)),
        }
    }
}

/// A company's live link to one ad account on one platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdConnection {
    pub id: String,
    pub company_id: String,
    pub platform: AdPlatform,
    pub external_account_id: String,
    pub account_name: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub sync_status: SyncStatus,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub sync_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdConnection {
    /// Whether the access token needs refreshing before use.
    ///
    /// Connections without a recorded expiry (Meta's long-lived tokens)
    /// never need a refresh.
    pub fn needs_token_refresh(&self) -> bool {
        if self.platform.has_non_expiring_tokens() {
            return false;
        }
        match self.token_expires_at {
            Some(expires_at) => {
                Utc::now() + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= expires_at
            }
            None => false,
        }
    }
}

/// Payload for establishing a connection after a successful OAuth callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdConnection {
    pub company_id: String,
    pub platform: AdPlatform,
    pub external_account_id: String,
    pub account_name: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
}

/// New token material written back after a refresh.
#[derive(Debug, Clone)]
pub struct TokenUpdate {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(platform: AdPlatform, expires_at: Option<DateTime<Utc>>) -> AdConnection {
        AdConnection {
            id: "conn-1".to_string(),
            company_id: "company-1".to_string(),
            platform,
            external_account_id: "acct-1".to_string(),
            account_name: "Main account".to_string(),
            access_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            token_expires_at: expires_at,
            sync_status: SyncStatus::Idle,
            last_sync_at: None,
            sync_error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_expired_token_needs_refresh() {
        let conn = connection(AdPlatform::Google, Some(Utc::now() - Duration::hours(1)));
        assert!(conn.needs_token_refresh());
    }

    #[test]
    fn test_token_inside_margin_needs_refresh() {
        let conn = connection(AdPlatform::Google, Some(Utc::now() + Duration::seconds(60)));
        assert!(conn.needs_token_refresh());
    }

    #[test]
    fn test_fresh_token_does_not_need_refresh() {
        let conn = connection(AdPlatform::Google, Some(Utc::now() + Duration::hours(1)));
        assert!(!conn.needs_token_refresh());
    }

    #[test]
    fn test_meta_tokens_never_refresh() {
        let conn = connection(AdPlatform::Meta, Some(Utc::now() - Duration::hours(1)));
        assert!(!conn.needs_token_refresh());
    }

    #[test]
    fn test_sync_status_round_trip() {
        for status in [
            SyncStatus::Idle,
            SyncStatus::Syncing,
            SyncStatus::Healthy,
            SyncStatus::Error,
        ] {
            assert_eq!(status.as_str().parse::<SyncStatus>().unwrap(), status);
        }
        assert!("unknown".parse::<SyncStatus>().is_err());
    }
}
