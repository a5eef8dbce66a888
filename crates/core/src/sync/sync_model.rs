use serde::{Deserialize, Serialize};

use adpulse_platforms::AdPlatform;

/// Default metrics lookback when the caller does not specify one.
pub const DEFAULT_DAYS_BACK: i64 = 30;

/// Caller-facing knobs for a sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptions {
    /// How many days of metrics to pull, ending today.
    pub days_back: i64,
    /// Restrict the run to one platform.
    pub platform: Option<AdPlatform>,
    /// Refresh tokens even when they are not near expiry.
    pub force_refresh: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            days_back: DEFAULT_DAYS_BACK,
            platform: None,
            force_refresh: false,
        }
    }
}

/// Operator-tunable sync engine configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How many companies sync concurrently during a full sweep.
    pub company_concurrency: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            company_concurrency: 4,
        }
    }
}

/// Outcome of syncing one connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub connection_id: String,
    pub platform: AdPlatform,
    pub account_id: String,
    pub success: bool,
    pub error: Option<String>,
    pub campaigns_synced: usize,
    pub metrics_synced: usize,
    pub creatives_synced: usize,
}

impl SyncResult {
    pub fn failed(connection_id: &str, platform: AdPlatform, account_id: &str, error: String) -> Self {
        Self {
            connection_id: connection_id.to_string(),
            platform,
            account_id: account_id.to_string(),
            success: false,
            error: Some(error),
            campaigns_synced: 0,
            metrics_synced: 0,
            creatives_synced: 0,
        }
    }
}

/// Aggregate view over a batch of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_campaigns: usize,
    pub total_metrics: usize,
}

impl SyncSummary {
    pub fn from_results(results: &[SyncResult]) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            total_campaigns: results.iter().map(|r| r.campaigns_synced).sum(),
            total_metrics: results.iter().map(|r| r.metrics_synced).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_results() {
        let results = vec![
            SyncResult {
                connection_id: "c1".to_string(),
                platform: AdPlatform::Google,
                account_id: "a1".to_string(),
                success: true,
                error: None,
                campaigns_synced: 3,
                metrics_synced: 90,
                creatives_synced: 0,
            },
            SyncResult::failed("c2", AdPlatform::Meta, "a2", "boom".to_string()),
        ];
        let summary = SyncSummary::from_results(&results);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total_campaigns, 3);
        assert_eq!(summary.total_metrics, 90);
    }

    #[test]
    fn test_default_options() {
        let options = SyncOptions::default();
        assert_eq!(options.days_back, DEFAULT_DAYS_BACK);
        assert!(options.platform.is_none());
        assert!(!options.force_refresh);
    }
}
