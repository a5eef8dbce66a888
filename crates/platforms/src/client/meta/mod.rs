//! Meta Ads platform client.
//!
//! Quirks this client encodes:
//! - Long-lived tokens that do not expire; `refresh_token` is a no-op.
//! - Cursor pagination via `paging.cursors.after`.
//! - `daily_budget` arrives in minor units (cents); insights money fields
//!   arrive as decimal strings.
//! - Revenue comes from the `purchase` entries of `action_values`.
//! - The only platform that exposes creatives.

mod normalize;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::client::{build_http_client, error_body, send_with_backoff, MAX_PAGES};
use crate::errors::PlatformError;
use crate::models::{
    AdAccount, AdPlatform, Campaign, Creative, DateRange, MetricsRecord, PlatformAppConfig,
    TokenSet,
};

use super::AdPlatformClient;

const BASE_URL: &str = "https://graph.facebook.com/v19.0";
const OAUTH_AUTHORIZE_URL: &str = "https://www.facebook.com/v19.0/dialog/oauth";
const PLATFORM: AdPlatform = AdPlatform::Meta;

/// Meta Ads client parameterized by one company's OAuth app.
pub struct MetaAdsClient {
    client: Client,
    config: PlatformAppConfig,
}

// ============================================================================
// Response structures for the Meta Graph API
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    cursors: Option<Cursors>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Cursors {
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawAdAccount {
    pub id: String,
    pub name: Option<String>,
    /// 1 = active; every other code is some flavor of disabled.
    pub account_status: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawCampaign {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<String>,
    /// Minor currency units (cents), as a string.
    pub daily_budget: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawInsightsRow {
    pub campaign_id: Option<String>,
    pub date_start: Option<String>,
    pub impressions: Option<String>,
    pub clicks: Option<String>,
    pub spend: Option<String>,
    #[serde(default)]
    pub action_values: Vec<RawActionValue>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawActionValue {
    pub action_type: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawCreative {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<String>,
}

impl MetaAdsClient {
    pub fn new(config: PlatformAppConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            client: build_http_client()?,
            config,
        })
    }

    /// Fetch every page of a Graph API edge, following `after` cursors
    /// until the platform stops returning one.
    async fn fetch_all<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        base_params: &[(&str, &str)],
    ) -> Result<Vec<T>, PlatformError> {
        let mut items = Vec::new();
        let mut after: Option<String> = None;
        let mut pages = 0usize;

        loop {
            if pages >= MAX_PAGES {
                return Err(PlatformError::AccountFetch {
                    platform: PLATFORM,
                    message: format!("pagination exceeded {} pages", MAX_PAGES),
                });
            }

            let mut request = self.client.get(url).query(base_params);
            if let Some(cursor) = &after {
                request = request.query(&[("after", cursor.as_str())]);
            }

            let response = send_with_backoff(PLATFORM, request).await?;
            if !response.status().is_success() {
                return Err(PlatformError::AccountFetch {
                    platform: PLATFORM,
                    message: error_body(response).await,
                });
            }

            let page: Page<T> = response.json().await.map_err(PlatformError::Network)?;
            pages += 1;
            items.extend(page.data);

            let next_cursor = page
                .paging
                .as_ref()
                .filter(|p| p.next.is_some())
                .and_then(|p| p.cursors.as_ref())
                .and_then(|c| c.after.clone());
            match next_cursor {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl AdPlatformClient for MetaAdsClient {
    fn platform(&self) -> AdPlatform {
        PLATFORM
    }

    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope=ads_read&state={}",
            OAUTH_AUTHORIZE_URL,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, PlatformError> {
        let url = format!("{}/oauth/access_token", BASE_URL);
        let request = self.client.get(&url).query(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ]);

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
            refresh_token: None,
            // Long-lived token; no expiry to track.
            expires_in: None,
        })
    }

    /// Meta tokens never expire once long-lived; nothing to refresh.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, PlatformError> {
        Ok(TokenSet {
            access_token: refresh_token.to_string(),
            refresh_token: None,
            expires_in: None,
        })
    }

    async fn list_accounts(&self, access_token: &str) -> Result<Vec<AdAccount>, PlatformError> {
        let url = format!("{}/me/adaccounts", BASE_URL);
        let raw: Vec<RawAdAccount> = self
            .fetch_all(
                &url,
                &[
                    ("fields", "id,name,account_status"),
                    ("access_token", access_token),
                ],
            )
            .await?;
        Ok(raw.into_iter().map(normalize::account).collect())
    }

    async fn list_campaigns(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<Vec<Campaign>, PlatformError> {
        let url = format!("{}/{}/campaigns", BASE_URL, account_id);
        let raw: Vec<RawCampaign> = self
            .fetch_all(
                &url,
                &[
                    ("fields", "id,name,status,daily_budget"),
                    ("limit", "100"),
                    ("access_token", access_token),
                ],
            )
            .await?;
        raw.iter().map(normalize::campaign).collect()
    }

    async fn list_metrics(
        &self,
        access_token: &str,
        account_id: &str,
        range: DateRange,
    ) -> Result<Vec<MetricsRecord>, PlatformError> {
        let url = format!("{}/{}/insights", BASE_URL, account_id);
        let time_range = format!(
            "{{\"since\":\"{}\",\"until\":\"{}\"}}",
            range.start, range.end
        );
        let raw: Vec<RawInsightsRow> = self
            .fetch_all(
                &url,
                &[
                    (
                        "fields",
                        "campaign_id,date_start,impressions,clicks,spend,action_values",
                    ),
                    ("level", "campaign"),
                    // Day-granularity buckets; the normalizer never re-buckets.
                    ("time_increment", "1"),
                    ("time_range", time_range.as_str()),
                    ("access_token", access_token),
                ],
            )
            .await?;
        raw.iter().map(normalize::metric).collect()
    }

    async fn list_creatives(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<Vec<Creative>, PlatformError> {
        let url = format!("{}/{}/adcreatives", BASE_URL, account_id);
        let raw: Vec<RawCreative> = self
            .fetch_all(
                &url,
                &[
                    ("fields", "id,name,status"),
                    ("limit", "100"),
                    ("access_token", access_token),
                ],
            )
            .await?;
        Ok(raw.into_iter().map(normalize::creative).collect())
    }
}
