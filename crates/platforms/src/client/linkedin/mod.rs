//! LinkedIn Ads platform client.
//!
//! Quirks this client encodes:
//! - start/count offset pagination with a paging.total.
//! - Money arrives as `{ "amount": "12.34", "currencyCode": "USD" }`
//!   objects.
//! - Analytics dates arrive as structured `{ day, month, year }` objects.
//! - Campaign ids in analytics rows are sponsored-campaign URNs.

mod normalize;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::client::{build_http_client, error_body, send_with_backoff, MAX_PAGES};
use crate::errors::PlatformError;
use crate::models::{
    AdAccount, AdPlatform, Campaign, DateRange, MetricsRecord, PlatformAppConfig, TokenSet,
};

use super::AdPlatformClient;

const BASE_URL: &str = "https://api.linkedin.com/rest";
const OAUTH_TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
const OAUTH_AUTHORIZE_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";
const PLATFORM: AdPlatform = AdPlatform::LinkedIn;
const PAGE_SIZE: usize = 100;

/// LinkedIn Ads client parameterized by one company's OAuth app.
pub struct LinkedInAdsClient {
    client: Client,
    config: PlatformAppConfig,
}

// ============================================================================
// Response structures for the LinkedIn Marketing API
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Elements<T> {
    #[serde(default = "Vec::new")]
    elements: Vec<T>,
    paging: Option<Paging>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct Paging {
    start: Option<usize>,
    count: Option<usize>,
    total: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawAdAccount {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawCampaign {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub daily_budget: Option<RawMoney>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawMoney {
    pub amount: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawAnalyticsRow {
    #[serde(default)]
    pub pivot_values: Vec<String>,
    pub date_range: Option<RawDateRange>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub cost_in_local_currency: Option<String>,
    pub conversion_value_in_local_currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawDateRange {
    pub start: Option<RawDate>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawDate {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl LinkedInAdsClient {
    pub fn new(config: PlatformAppConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            client: build_http_client()?,
            config,
        })
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
    ) -> Result<Result<TokenResponse, String>, PlatformError> {
        let request = self.client.post(OAUTH_TOKEN_URL).form(params);
        let response = send_with_backoff(PLATFORM, request).await?;
        if !response.status().is_success() {
            return Ok(Err(error_body(response).await));
        }
        let token: TokenResponse = response.json().await.map_err(PlatformError::Network)?;
        Ok(Ok(token))
    }

    /// Fetch every page of an elements collection with start/count
    /// pagination, stopping when the reported total is reached.
    async fn fetch_all<T: serde::de::DeserializeOwned>(
        &self,
        access_token: &str,
        url: &str,
        base_params: &[(&str, &str)],
    ) -> Result<Vec<T>, PlatformError> {
        let mut items: Vec<T> = Vec::new();
        let mut start = 0usize;
        let mut pages = 0usize;

        loop {
            if pages >= MAX_PAGES {
                return Err(PlatformError::AccountFetch {
                    platform: PLATFORM,
                    message: format!("pagination exceeded {} pages", MAX_PAGES),
                });
            }

            let start_param = start.to_string();
            let count_param = PAGE_SIZE.to_string();
            let request = self
                .client
                .get(url)
                .bearer_auth(access_token)
                .header("LinkedIn-Version", "202405")
                .query(base_params)
                .query(&[
                    ("start", start_param.as_str()),
                    ("count", count_param.as_str()),
                ]);

            let response = send_with_backoff(PLATFORM, request).await?;
            if !response.status().is_success() {
                return Err(PlatformError::AccountFetch {
                    platform: PLATFORM,
                    message: error_body(response).await,
                });
            }

            let page: Elements<T> = response.json().await.map_err(PlatformError::Network)?;
            pages += 1;
            let received = page.elements.len();
            items.extend(page.elements);

            let total = page.paging.as_ref().and_then(|p| p.total);
            start += received;
            let exhausted = match total {
                Some(total) => start >= total,
                None => received < PAGE_SIZE,
            };
            if received == 0 || exhausted {
                break;
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl AdPlatformClient for LinkedInAdsClient {
    fn platform(&self) -> AdPlatform {
        PLATFORM
    }

    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            OAUTH_AUTHORIZE_URL,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode("r_ads r_ads_reporting"),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, PlatformError> {
        let token = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await?
            .map_err(|message| PlatformError::TokenExchange {
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
        let token = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .await?
            .map_err(|message| PlatformError::TokenRefresh {
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
        let url = format!("{}/adAccounts", BASE_URL);
        let raw: Vec<RawAdAccount> = self
            .fetch_all(access_token, &url, &[("q", "search")])
            .await?;
        raw.into_iter().map(normalize::account).collect()
    }

    async fn list_campaigns(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<Vec<Campaign>, PlatformError> {
        let url = format!("{}/adAccounts/{}/adCampaigns", BASE_URL, account_id);
        let raw: Vec<RawCampaign> = self
            .fetch_all(access_token, &url, &[("q", "search")])
            .await?;
        raw.iter().map(normalize::campaign).collect()
    }

    async fn list_metrics(
        &self,
        access_token: &str,
        account_id: &str,
        range: DateRange,
    ) -> Result<Vec<MetricsRecord>, PlatformError> {
        let url = format!("{}/adAnalytics", BASE_URL);
        let account_urn = format!("urn:li:sponsoredAccount:{}", account_id);
        let start_param = format!(
            "(start:(day:{},month:{},year:{}),end:(day:{},month:{},year:{}))",
            range.start.format("%-d"),
            range.start.format("%-m"),
            range.start.format("%Y"),
            range.end.format("%-d"),
            range.end.format("%-m"),
            range.end.format("%Y"),
        );
        let raw: Vec<RawAnalyticsRow> = self
            .fetch_all(
                access_token,
                &url,
                &[
                    ("q", "analytics"),
                    ("pivot", "CAMPAIGN"),
                    // Day granularity; the normalizer never re-buckets.
                    ("timeGranularity", "DAILY"),
                    ("dateRange", start_param.as_str()),
                    ("accounts", account_urn.as_str()),
                    (
                        "fields",
                        "pivotValues,dateRange,impressions,clicks,costInLocalCurrency,conversionValueInLocalCurrency",
                    ),
                ],
            )
            .await?;
        raw.iter().map(normalize::metric).collect()
    }
}
