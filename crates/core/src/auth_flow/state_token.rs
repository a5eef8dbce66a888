//! Signed state-token codec for the OAuth redirect round trip.
//!
//! The token is an HS256 JWT so it survives the browser redirect
//! unmodified and any tampering breaks the signature. Expiry is checked
//! by [`StateTokenCodec::validate`] rather than by signature-level `exp`
//! enforcement, so an expired-but-authentic token still decodes and can
//! be reported as expired instead of malformed.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use adpulse_platforms::AdPlatform;

use crate::errors::{Error, Result};

use super::AuthFlowState;

/// Validity window of a state token, in seconds.
pub const STATE_TOKEN_WINDOW_SECS: i64 = 10 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    company_id: String,
    user_id: String,
    platform: AdPlatform,
    iat: i64,
    exp: i64,
}

/// Encodes and decodes authorization-flow state tokens.
///
/// Pure functions over the opaque token string; no side effects.
pub struct StateTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl StateTokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Serialize and sign the state.
    pub fn encode(&self, state: &AuthFlowState) -> Result<String> {
        let iat = state.issued_at.timestamp();
        let claims = StateClaims {
            company_id: state.company_id.clone(),
            user_id: state.user_id.clone(),
            platform: state.platform,
            iat,
            exp: iat + STATE_TOKEN_WINDOW_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Unexpected(format!("Failed to encode state token: {}", e)))
    }

    /// Decode a token back into its state.
    ///
    /// Returns `None` on any malformed, tampered or foreign token,
    /// never an error to the caller. Expiry is left to [`validate`].
    ///
    /// [`validate`]: Self::validate
    pub fn decode(&self, token: &str) -> Option<AuthFlowState> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data =
            jsonwebtoken::decode::<StateClaims>(token, &self.decoding_key, &validation).ok()?;
        let claims = data.claims;
        Some(AuthFlowState {
            company_id: claims.company_id,
            user_id: claims.user_id,
            platform: claims.platform,
            issued_at: chrono::DateTime::from_timestamp(claims.iat, 0)?,
        })
    }

    /// Whether a decoded state is still usable on this callback.
    ///
    /// Fails when the token is older than the validity window (replay
    /// protection) or when the platform does not match the callback
    /// route being invoked.
    pub fn validate(&self, state: &AuthFlowState, expected_platform: AdPlatform) -> bool {
        if state.platform != expected_platform {
            return false;
        }
        let age = Utc::now() - state.issued_at;
        age <= Duration::seconds(STATE_TOKEN_WINDOW_SECS) && age >= Duration::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> StateTokenCodec {
        StateTokenCodec::new(b"test-secret-key-for-state-tokens")
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let codec = codec();
        let state = AuthFlowState::new("company-1", "user-1", AdPlatform::Google);
        let token = codec.encode(&state).unwrap();
        let decoded = codec.decode(&token).unwrap();
        assert_eq!(decoded.company_id, "company-1");
        assert_eq!(decoded.user_id, "user-1");
        assert_eq!(decoded.platform, AdPlatform::Google);
        assert!(codec.validate(&decoded, AdPlatform::Google));
    }

    #[test]
    fn test_tampered_token_decodes_to_none() {
        let codec = codec();
        let state = AuthFlowState::new("company-1", "user-1", AdPlatform::Meta);
        let mut token = codec.encode(&state).unwrap();
        token.push('x');
        assert!(codec.decode(&token).is_none());
    }

    #[test]
    fn test_garbage_token_decodes_to_none() {
        assert!(codec().decode("not-a-token").is_none());
        assert!(codec().decode("").is_none());
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let state = AuthFlowState::new("company-1", "user-1", AdPlatform::TikTok);
        let token = codec().encode(&state).unwrap();
        let other = StateTokenCodec::new(b"a-completely-different-secret");
        assert!(other.decode(&token).is_none());
    }

    #[test]
    fn test_expired_state_fails_validate() {
        let codec = codec();
        let mut state = AuthFlowState::new("company-1", "user-1", AdPlatform::Google);
        // 11 minutes old against a 10-minute window.
        state.issued_at = Utc::now() - Duration::minutes(11);
        let token = codec.encode(&state).unwrap();
        let decoded = codec.decode(&token).expect("authentic token still decodes");
        assert!(!codec.validate(&decoded, AdPlatform::Google));
    }

    #[test]
    fn test_platform_mismatch_fails_validate() {
        let codec = codec();
        let state = AuthFlowState::new("company-1", "user-1", AdPlatform::Google);
        assert!(!codec.validate(&state, AdPlatform::Meta));
    }
}
