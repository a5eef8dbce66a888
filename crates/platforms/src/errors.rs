//! Error types for ad-platform operations.

use thiserror::Error;

use crate::models::AdPlatform;

/// Errors that can occur while talking to an ad platform.
///
/// All variants are connection-scoped: the sync engine catches them at the
/// per-connection boundary and records them into the connection's sync
/// health, so a failure against one platform never propagates to siblings.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Authorization-code exchange was rejected by the platform.
    /// Codes are single-use; callers must not retry the exchange.
    #[error("Token exchange failed: {platform} - {message}")]
    TokenExchange {
        platform: AdPlatform,
        message: String,
    },

    /// Token refresh was rejected by the platform.
    #[error("Token refresh failed: {platform} - {message}")]
    TokenRefresh {
        platform: AdPlatform,
        message: String,
    },

    /// Account, campaign, metric or creative listing failed.
    /// An empty listing is a valid result, not this error.
    #[error("Fetch failed: {platform} - {message}")]
    AccountFetch {
        platform: AdPlatform,
        message: String,
    },

    /// The platform rate limited the request and the bounded retry
    /// was also rejected.
    #[error("Rate limited: {platform}")]
    RateLimited { platform: AdPlatform },

    /// The request to the platform timed out.
    #[error("Timeout: {platform}")]
    Timeout { platform: AdPlatform },

    /// The platform returned a payload that could not be mapped into the
    /// canonical shapes.
    #[error("Normalization failed: {platform} - {message}")]
    Normalization {
        platform: AdPlatform,
        message: String,
    },

    /// The operation is not offered by this platform.
    #[error("Not supported: {operation} on {platform}")]
    NotSupported {
        platform: AdPlatform,
        operation: String,
    },

    /// A network error occurred while communicating with the platform.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl PlatformError {
    /// Whether the failure is transient (likely to succeed on the next
    /// scheduled sync without any change on our side).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout { .. } | Self::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_transient() {
        let error = PlatformError::RateLimited {
            platform: AdPlatform::Google,
        };
        assert!(error.is_transient());
    }

    #[test]
    fn test_timeout_is_transient() {
        let error = PlatformError::Timeout {
            platform: AdPlatform::TikTok,
        };
        assert!(error.is_transient());
    }

    #[test]
    fn test_token_exchange_is_not_transient() {
        let error = PlatformError::TokenExchange {
            platform: AdPlatform::Meta,
            message: "invalid code".to_string(),
        };
        assert!(!error.is_transient());
    }

    #[test]
    fn test_error_display() {
        let error = PlatformError::TokenRefresh {
            platform: AdPlatform::LinkedIn,
            message: "refresh token revoked".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Token refresh failed: linkedin - refresh token revoked"
        );

        let error = PlatformError::RateLimited {
            platform: AdPlatform::Google,
        };
        assert_eq!(format!("{}", error), "Rate limited: google");
    }
}
