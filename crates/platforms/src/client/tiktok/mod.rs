//! TikTok Ads platform client.
//!
//! Quirks this client encodes:
//! - Every response is wrapped in a `{ code, message, data }` envelope;
//!   a non-zero code is a failure even on HTTP 200.
//! - page/total_page pagination with an `Access-Token` header.
//! - Historical metrics are limited to a maximum lookback window; ranges
//!   reaching further back are clamped to it.
//! - The OAuth callback carries the code in `auth_code`, not `code`.

mod normalize;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::client::{build_http_client, error_body, send_with_backoff, MAX_PAGES};
use crate::errors::PlatformError;
use crate::models::{
    AdAccount, AdPlatform, Campaign, DateRange, MetricsRecord, PlatformAppConfig, TokenSet,
};

use super::AdPlatformClient;

const BASE_URL: &str = "https://business-api.tiktok.com/open_api/v1.3";
const OAUTH_AUTHORIZE_URL: &str = "https://business-api.tiktok.com/portal/auth";
const PLATFORM: AdPlatform = AdPlatform::TikTok;
const PAGE_SIZE: usize = 100;

/// Maximum historical lookback the reporting API accepts, in days.
pub(super) const MAX_LOOKBACK_DAYS: i64 = 365;

/// TikTok Ads client parameterized by one company's OAuth app.
pub struct TikTokAdsClient {
    client: Client,
    config: PlatformAppConfig,
}

// ============================================================================
// Response structures for the TikTok Business API
// ============================================================================

/// Standard response envelope; `code` zero means success.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ListData<T> {
    #[serde(default = "Vec::new")]
    list: Vec<T>,
    page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    page: Option<usize>,
    total_page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawAdvertiser {
    pub advertiser_id: serde_json::Value,
    pub advertiser_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawCampaign {
    pub campaign_id: serde_json::Value,
    pub campaign_name: Option<String>,
    pub operation_status: Option<String>,
    /// Daily budget in whole currency units.
    pub budget: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawReportRow {
    pub dimensions: RawReportDimensions,
    pub metrics: RawReportMetrics,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawReportDimensions {
    pub campaign_id: serde_json::Value,
    /// "2025-06-01 00:00:00"
    pub stat_time_day: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawReportMetrics {
    pub impressions: Option<String>,
    pub clicks: Option<String>,
    pub spend: Option<String>,
    pub total_complete_payment: Option<String>,
}

impl TikTokAdsClient {
    pub fn new(config: PlatformAppConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            client: build_http_client()?,
            config,
        })
    }

    /// Unwrap the TikTok envelope, mapping non-zero codes to an error
    /// built by `to_error`.
    fn unwrap_envelope<T>(
        envelope: Envelope<T>,
        to_error: impl FnOnce(String) -> PlatformError,
    ) -> Result<T, PlatformError> {
        if envelope.code != 0 {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("code {}", envelope.code));
            return Err(to_error(message));
        }
        envelope.data.ok_or_else(|| PlatformError::Normalization {
            platform: PLATFORM,
            message: "envelope missing data".to_string(),
        })
    }

    async fn get_enveloped<T: serde::de::DeserializeOwned>(
        &self,
        access_token: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        let request = self
            .client
            .get(url)
            .header("Access-Token", access_token)
            .query(params);
        let response = send_with_backoff(PLATFORM, request).await?;
        if !response.status().is_success() {
            return Err(PlatformError::AccountFetch {
                platform: PLATFORM,
                message: error_body(response).await,
            });
        }
        let envelope: Envelope<T> = response.json().await.map_err(PlatformError::Network)?;
        Self::unwrap_envelope(envelope, |message| PlatformError::AccountFetch {
            platform: PLATFORM,
            message,
        })
    }

    /// Fetch every page of a TikTok list endpoint.
    async fn fetch_all<T: serde::de::DeserializeOwned>(
        &self,
        access_token: &str,
        url: &str,
        base_params: &[(&str, &str)],
    ) -> Result<Vec<T>, PlatformError> {
        let mut items = Vec::new();
        let mut page = 1usize;
        let mut pages_fetched = 0usize;

        loop {
            if pages_fetched >= MAX_PAGES {
                return Err(PlatformError::AccountFetch {
                    platform: PLATFORM,
                    message: format!("pagination exceeded {} pages", MAX_PAGES),
                });
            }

            let page_param = page.to_string();
            let size_param = PAGE_SIZE.to_string();
            let mut params: Vec<(&str, &str)> = base_params.to_vec();
            params.push(("page", page_param.as_str()));
            params.push(("page_size", size_param.as_str()));

            let data: ListData<T> = self.get_enveloped(access_token, url, &params).await?;
            pages_fetched += 1;
            items.extend(data.list);

            let (current, total) = match data.page_info {
                Some(info) => (
                    info.page.unwrap_or(page),
                    info.total_page.unwrap_or(page),
                ),
                None => break,
            };
            if current >= total {
                break;
            }
            page = current + 1;
        }

        Ok(items)
    }
}

#[async_trait]
impl AdPlatformClient for TikTokAdsClient {
    fn platform(&self) -> AdPlatform {
        PLATFORM
    }

    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?app_id={}&redirect_uri={}&state={}",
            OAUTH_AUTHORIZE_URL,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, PlatformError> {
        let url = format!("{}/oauth2/access_token/", BASE_URL);
        let body = serde_json::json!({
            "app_id": self.config.client_id,
            "secret": self.config.client_secret,
            "auth_code": code,
        });

        let request = self.client.post(&url).json(&body);
        let response = send_with_backoff(PLATFORM, request).await?;
        if !response.status().is_success() {
            return Err(PlatformError::TokenExchange {
                platform: PLATFORM,
                message: error_body(response).await,
            });
        }

        let envelope: Envelope<TokenData> =
            response.json().await.map_err(PlatformError::Network)?;
        let token = Self::unwrap_envelope(envelope, |message| PlatformError::TokenExchange {
            platform: PLATFORM,
            message,
        })?;
        Ok(TokenSet {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, PlatformError> {
        let url = format!("{}/oauth2/refresh_token/", BASE_URL);
        let body = serde_json::json!({
            "app_id": self.config.client_id,
            "secret": self.config.client_secret,
            "refresh_token": refresh_token,
        });

        let request = self.client.post(&url).json(&body);
        let response = send_with_backoff(PLATFORM, request).await?;
        if !response.status().is_success() {
            return Err(PlatformError::TokenRefresh {
                platform: PLATFORM,
                message: error_body(response).await,
            });
        }

        let envelope: Envelope<TokenData> =
            response.json().await.map_err(PlatformError::Network)?;
        let token = Self::unwrap_envelope(envelope, |message| PlatformError::TokenRefresh {
            platform: PLATFORM,
            message,
        })?;
        Ok(TokenSet {
            access_token: token.access_token,
            refresh_token: token
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            expires_in: token.expires_in,
        })
    }

    async fn list_accounts(&self, access_token: &str) -> Result<Vec<AdAccount>, PlatformError> {
        let url = format!("{}/oauth2/advertiser/get/", BASE_URL);
        let data: ListData<RawAdvertiser> = self
            .get_enveloped(
                access_token,
                &url,
                &[
                    ("app_id", self.config.client_id.as_str()),
                    ("secret", self.config.client_secret.as_str()),
                ],
            )
            .await?;
        data.list.into_iter().map(normalize::account).collect()
    }

    async fn list_campaigns(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<Vec<Campaign>, PlatformError> {
        let url = format!("{}/campaign/get/", BASE_URL);
        let raw: Vec<RawCampaign> = self
            .fetch_all(access_token, &url, &[("advertiser_id", account_id)])
            .await?;
        raw.iter().map(normalize::campaign).collect()
    }

    async fn list_metrics(
        &self,
        access_token: &str,
        account_id: &str,
        range: DateRange,
    ) -> Result<Vec<MetricsRecord>, PlatformError> {
        let clamped = range.clamp_lookback(MAX_LOOKBACK_DAYS);
        if clamped != range {
            debug!(
                "[tiktok] metrics range clamped to {} days: {} -> {}",
                MAX_LOOKBACK_DAYS, clamped.start, clamped.end
            );
        }

        let url = format!("{}/report/integrated/get/", BASE_URL);
        let start = clamped.start.to_string();
        let end = clamped.end.to_string();
        let raw: Vec<RawReportRow> = self
            .fetch_all(
                access_token,
                &url,
                &[
                    ("advertiser_id", account_id),
                    ("report_type", "BASIC"),
                    ("data_level", "AUCTION_CAMPAIGN"),
                    // stat_time_day gives day-granularity buckets.
                    ("dimensions", "[\"campaign_id\",\"stat_time_day\"]"),
                    (
                        "metrics",
                        "[\"impressions\",\"clicks\",\"spend\",\"total_complete_payment\"]",
                    ),
                    ("start_date", start.as_str()),
                    ("end_date", end.as_str()),
                ],
            )
            .await?;
        raw.iter().map(normalize::metric).collect()
    }
}
