use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use adpulse_platforms::{AdPlatform, PlatformAppConfig};

/// OAuth application credentials a company has registered for one platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyOAuthApp {
    pub id: String,
    pub company_id: String,
    pub platform: AdPlatform,
    pub client_id: String,
    pub client_secret: String,
    /// Google Ads requires a developer token on every API call; other
    /// platforms leave this empty.
    pub developer_token: Option<String>,
    pub redirect_uri: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyOAuthApp {
    /// Project the stored row into the config shape platform clients take.
    pub fn to_platform_config(&self) -> PlatformAppConfig {
        PlatformAppConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            developer_token: self.developer_token.clone(),
            redirect_uri: self.redirect_uri.clone(),
        }
    }
}

/// Payload for registering or replacing a company's OAuth app.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompanyOAuthApp {
    pub company_id: String,
    pub platform: AdPlatform,
    pub client_id: String,
    pub client_secret: String,
    pub developer_token: Option<String>,
    pub redirect_uri: String,
}
