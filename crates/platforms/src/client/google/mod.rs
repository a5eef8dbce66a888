//! Google Ads platform client.
//!
//! Quirks this client encodes:
//! - All monetary values arrive as fixed-point micros (int64-as-string)
//!   and are divided by 1,000,000 during normalization.
//! - Every API call carries a `developer-token` header in addition to the
//!   OAuth bearer token.
//! - Campaign and metrics listing use GAQL `search` with page-token
//!   pagination.

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

const BASE_URL: &str = "https://googleads.googleapis.com/v17";
const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const OAUTH_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const ADWORDS_SCOPE: &str = "https://www.googleapis.com/auth/adwords";
const PLATFORM: AdPlatform = AdPlatform::Google;

const CAMPAIGN_QUERY: &str = "SELECT campaign.id, campaign.name, campaign.status, \
     campaign_budget.amount_micros FROM campaign ORDER BY campaign.id";

/// Google Ads client parameterized by one company's OAuth app.
pub struct GoogleAdsClient {
    client: Client,
    config: PlatformAppConfig,
}

// ============================================================================
// Response structures for the Google Ads REST API
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAccessibleCustomersResponse {
    #[serde(default)]
    resource_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchRow>,
    next_page_token: Option<String>,
}

/// One GAQL result row. Int64 fields arrive as JSON strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchRow {
    pub campaign: Option<RawCampaign>,
    pub campaign_budget: Option<RawBudget>,
    pub metrics: Option<RawMetrics>,
    pub segments: Option<RawSegments>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawCampaign {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawBudget {
    pub amount_micros: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawMetrics {
    pub impressions: Option<String>,
    pub clicks: Option<String>,
    pub cost_micros: Option<String>,
    pub conversions_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawSegments {
    pub date: Option<String>,
}

impl GoogleAdsClient {
    pub fn new(config: PlatformAppConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            client: build_http_client()?,
            config,
        })
    }

    fn developer_token(&self) -> &str {
        self.config.developer_token.as_deref().unwrap_or_default()
    }

    /// Run a GAQL query against an account, paging until the platform
    /// stops returning a next-page token.
    async fn search(
        &self,
        access_token: &str,
        account_id: &str,
        query: &str,
    ) -> Result<Vec<SearchRow>, PlatformError> {
        let url = format!("{}/customers/{}/googleAds:search", BASE_URL, account_id);
        let mut rows = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            if pages >= MAX_PAGES {
                return Err(PlatformError::AccountFetch {
                    platform: PLATFORM,
                    message: format!("pagination exceeded {} pages", MAX_PAGES),
                });
            }

            let mut body = serde_json::json!({ "query": query, "pageSize": 500 });
            if let Some(token) = &page_token {
                body["pageToken"] = serde_json::Value::String(token.clone());
            }

            let request = self
                .client
                .post(&url)
                .bearer_auth(access_token)
                .header("developer-token", self.developer_token())
                .json(&body);

            let response = send_with_backoff(PLATFORM, request).await?;
            if !response.status().is_success() {
                return Err(PlatformError::AccountFetch {
                    platform: PLATFORM,
                    message: error_body(response).await,
                });
            }

            let page: SearchResponse = response.json().await.map_err(PlatformError::Network)?;
            pages += 1;
            rows.extend(page.results);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(rows)
    }
}

#[async_trait]
impl AdPlatformClient for GoogleAdsClient {
    fn platform(&self) -> AdPlatform {
        PLATFORM
    }

    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
            OAUTH_AUTHORIZE_URL,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(ADWORDS_SCOPE),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, PlatformError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let request = self.client.post(OAUTH_TOKEN_URL).form(&params);
        let response = send_with_backoff(PLATFORM, request).await?;
        if !response.status().is_success() {
            return Err(PlatformError::TokenExchange {
                platform: PLATFORM,
                message: error_body(response).await,
            });
        }

        let token: TokenResponse = response.json().await.map_err(PlatformError::Network)?;
        Ok(TokenSet {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, PlatformError> {
        let params = [
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let request = self.client.post(OAUTH_TOKEN_URL).form(&params);
        let response = send_with_backoff(PLATFORM, request).await?;
        if !response.status().is_success() {
            return Err(PlatformError::TokenRefresh {
                platform: PLATFORM,
                message: error_body(response).await,
            });
        }

        let token: TokenResponse = response.json().await.map_err(PlatformError::Network)?;
        Ok(TokenSet {
            access_token: token.access_token,
            // Google does not rotate refresh tokens on refresh.
            refresh_token: Some(refresh_token.to_string()),
            expires_in: token.expires_in,
        })
    }

    async fn list_accounts(&self, access_token: &str) -> Result<Vec<AdAccount>, PlatformError> {
        let url = format!("{}/customers:listAccessibleCustomers", BASE_URL);
        let request = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .header("developer-token", self.developer_token());

        let response = send_with_backoff(PLATFORM, request).await?;
        if !response.status().is_success() {
            return Err(PlatformError::AccountFetch {
                platform: PLATFORM,
                message: error_body(response).await,
            });
        }

        let body: ListAccessibleCustomersResponse =
            response.json().await.map_err(PlatformError::Network)?;
        Ok(body
            .resource_names
            .into_iter()
            .map(|resource_name| {
                let id = resource_name
                    .strip_prefix("customers/")
                    .unwrap_or(&resource_name)
                    .to_string();
                AdAccount {
                    name: format!("Google Ads {}", id),
                    id,
                    // listAccessibleCustomers does not report a status.
                    status: None,
                }
            })
            .collect())
    }

    async fn list_campaigns(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<Vec<Campaign>, PlatformError> {
        let rows = self.search(access_token, account_id, CAMPAIGN_QUERY).await?;
        rows.iter().map(normalize::campaign).collect()
    }

    async fn list_metrics(
        &self,
        access_token: &str,
        account_id: &str,
        range: DateRange,
    ) -> Result<Vec<MetricsRecord>, PlatformError> {
        let query = format!(
            "SELECT campaign.id, metrics.impressions, metrics.clicks, metrics.cost_micros, \
             metrics.conversions_value, segments.date FROM campaign \
             WHERE segments.date BETWEEN '{}' AND '{}' ORDER BY segments.date",
            range.start, range.end
        );
        let rows = self.search(access_token, account_id, &query).await?;
        rows.iter().map(normalize::metric).collect()
    }
}
