//! Authorization-flow state domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use adpulse_platforms::AdPlatform;

/// Context carried across the OAuth redirect round trip.
///
/// Ephemeral: never persisted, exists only inside the encoded state
/// token handed to the platform and returned on the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthFlowState {
    pub company_id: String,
    pub user_id: String,
    pub platform: AdPlatform,
    pub issued_at: DateTime<Utc>,
}

impl AuthFlowState {
    pub fn new(company_id: impl Into<String>, user_id: impl Into<String>, platform: AdPlatform) -> Self {
        Self {
            company_id: company_id.into(),
            user_id: user_id.into(),
            platform,
            issued_at: Utc::now(),
        }
    }
}
