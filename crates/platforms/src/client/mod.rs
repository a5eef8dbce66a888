//! Ad-platform client trait and factory.
//!
//! One concrete client per platform, selected by platform tag. Every
//! client is parameterized by a company's [`PlatformAppConfig`] and is
//! stateless beyond it: tokens are handed in per call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;

use crate::errors::PlatformError;
use crate::models::{
    AdAccount, AdPlatform, Campaign, Creative, DateRange, MetricsRecord, PlatformAppConfig,
    TokenSet,
};

pub mod google;
pub mod linkedin;
pub mod meta;
pub mod tiktok;

/// Default timeout for platform API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Cap on how long a rate-limit retry will wait, regardless of the
/// Retry-After header the platform sends.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Safety cap on pagination; a platform that pages past this is stuck.
pub(crate) const MAX_PAGES: usize = 1_000;

/// Common capability set every ad platform implements.
///
/// Listing calls page through the platform's own pagination until
/// exhausted; a failure mid-pagination fails the whole call rather than
/// returning a truncated result.
#[async_trait]
pub trait AdPlatformClient: Send + Sync {
    /// The platform this client talks to.
    fn platform(&self) -> AdPlatform;

    /// The platform authorization URL embedding the encoded state token.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for tokens.
    ///
    /// Codes are single-use; callers must not retry a failed exchange.
    async fn exchange_code(&self, code: &str) -> Result<TokenSet, PlatformError>;

    /// Refresh an expired access token.
    ///
    /// Meta issues non-expiring tokens and returns the input unchanged.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, PlatformError>;

    /// List the ad accounts reachable by a token.
    ///
    /// An empty result is a valid outcome meaning no ad accounts are
    /// reachable, not an error.
    async fn list_accounts(&self, access_token: &str) -> Result<Vec<AdAccount>, PlatformError>;

    /// List all campaigns in an ad account.
    async fn list_campaigns(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<Vec<Campaign>, PlatformError>;

    /// List per-day metrics for an ad account over a date range.
    async fn list_metrics(
        &self,
        access_token: &str,
        account_id: &str,
        range: DateRange,
    ) -> Result<Vec<MetricsRecord>, PlatformError>;

    /// List creatives in an ad account.
    ///
    /// Default implementation returns `NotSupported`; only Meta exposes
    /// creatives.
    async fn list_creatives(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<Vec<Creative>, PlatformError> {
        let _ = (access_token, account_id);
        Err(PlatformError::NotSupported {
            platform: self.platform(),
            operation: "list_creatives".to_string(),
        })
    }
}

/// Selects the concrete client for a platform tag.
///
/// Exists as a trait so the sync engine can be tested against stub
/// clients without touching the network.
pub trait ClientFactory: Send + Sync {
    fn client_for(
        &self,
        platform: AdPlatform,
        config: &PlatformAppConfig,
    ) -> Result<Arc<dyn AdPlatformClient>, PlatformError>;
}

/// Factory producing the real HTTP-backed clients.
#[derive(Debug, Clone, Default)]
pub struct DefaultClientFactory;

impl ClientFactory for DefaultClientFactory {
    fn client_for(
        &self,
        platform: AdPlatform,
        config: &PlatformAppConfig,
    ) -> Result<Arc<dyn AdPlatformClient>, PlatformError> {
        client_for(platform, config)
    }
}

/// Build the concrete client for a platform.
pub fn client_for(
    platform: AdPlatform,
    config: &PlatformAppConfig,
) -> Result<Arc<dyn AdPlatformClient>, PlatformError> {
    Ok(match platform {
        AdPlatform::Google => Arc::new(google::GoogleAdsClient::new(config.clone())?),
        AdPlatform::Meta => Arc::new(meta::MetaAdsClient::new(config.clone())?),
        AdPlatform::LinkedIn => Arc::new(linkedin::LinkedInAdsClient::new(config.clone())?),
        AdPlatform::TikTok => Arc::new(tiktok::TikTokAdsClient::new(config.clone())?),
    })
}

/// Build the shared HTTP client with the bounded request timeout.
pub(crate) fn build_http_client() -> Result<reqwest::Client, PlatformError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(PlatformError::Network)
}

/// Send a request, retrying once on HTTP 429 with the platform's
/// Retry-After delay (capped).
///
/// This is the only retry in the sync engine; everything else relies on
/// the next scheduled run.
pub(crate) async fn send_with_backoff(
    platform: AdPlatform,
    builder: reqwest::RequestBuilder,
) -> Result<reqwest::Response, PlatformError> {
    let retry_builder = builder.try_clone();

    let response = dispatch(platform, builder).await?;
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return Ok(response);
    }

    let Some(retry_builder) = retry_builder else {
        return Err(PlatformError::RateLimited { platform });
    };

    let wait = retry_after_secs(&response).min(MAX_RETRY_AFTER_SECS);
    debug!("[{}] rate limited, retrying in {}s", platform, wait);
    tokio::time::sleep(Duration::from_secs(wait)).await;

    let response = dispatch(platform, retry_builder).await?;
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        return Err(PlatformError::RateLimited { platform });
    }
    Ok(response)
}

async fn dispatch(
    platform: AdPlatform,
    builder: reqwest::RequestBuilder,
) -> Result<reqwest::Response, PlatformError> {
    builder.send().await.map_err(|e| {
        if e.is_timeout() {
            PlatformError::Timeout { platform }
        } else {
            PlatformError::Network(e)
        }
    })
}

fn retry_after_secs(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1)
}

/// Read an error body for a non-2xx response, truncated for logs.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!(
        "HTTP {}: {}",
        status,
        body.chars().take(200).collect::<String>()
    )
}
