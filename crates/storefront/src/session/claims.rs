//! Unverified JWT claim extraction.
//!
//! The backend issues a bearer token at login; the client decodes its payload
//! for display claims only (who to greet, whether to show the admin link).
//! The signature is NOT checked here - authorization stays server-enforced,
//! and a forged token buys nothing beyond a broken-looking UI.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while decoding token claims.
#[derive(Debug, Clone, Error)]
pub enum ClaimsError {
    /// The token is not a three-segment JWT.
    #[error("token is not a JWT")]
    Malformed,
    /// The payload segment is not valid base64url.
    #[error("token payload is not base64url: {0}")]
    Base64(String),
    /// The payload did not contain the expected claims.
    #[error("token claims did not parse: {0}")]
    Claims(String),
}

/// Identity claims carried in the access token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user's email address.
    pub sub: String,
    /// Display username.
    pub username: String,
    /// User's database ID.
    pub id: i64,
    /// Whether the admin navigation should be shown.
    #[serde(default)]
    pub is_admin: bool,
    /// Expiry as a unix timestamp, when the backend sets one.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Whether the token was already expired at `now` (unix seconds).
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }
}

/// Decode the payload segment of a JWT without verifying its signature.
///
/// # Errors
///
/// Returns an error if the token is not a three-segment JWT or its payload
/// does not decode into [`TokenClaims`].
pub fn decode_unverified(token: &str) -> Result<TokenClaims, ClaimsError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(ClaimsError::Malformed);
    }
    let payload = segments.get(1).ok_or(ClaimsError::Malformed)?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| ClaimsError::Base64(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| ClaimsError::Claims(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn make_token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_decode_full_claims() {
        let token = make_token(&serde_json::json!({
            "sub": "linh@example.com",
            "username": "linh",
            "id": 7,
            "is_admin": true,
            "exp": 4_102_444_800_i64,
        }));

        let claims = decode_unverified(&token).unwrap();
        assert_eq!(claims.sub, "linh@example.com");
        assert_eq!(claims.username, "linh");
        assert_eq!(claims.id, 7);
        assert!(claims.is_admin);
        assert!(!claims.is_expired_at(4_102_444_799));
        assert!(claims.is_expired_at(4_102_444_800));
    }

    #[test]
    fn test_decode_defaults() {
        let token = make_token(&serde_json::json!({
            "sub": "a@b.c",
            "username": "a",
            "id": 1,
        }));

        let claims = decode_unverified(&token).unwrap();
        assert!(!claims.is_admin);
        assert_eq!(claims.exp, None);
        assert!(!claims.is_expired_at(i64::MAX));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_unverified("not-a-jwt"),
            Err(ClaimsError::Malformed)
        ));
        assert!(matches!(
            decode_unverified("a.!!!.c"),
            Err(ClaimsError::Base64(_))
        ));
        let token = format!("a.{}.c", URL_SAFE_NO_PAD.encode("{}"));
        assert!(matches!(
            decode_unverified(&token),
            Err(ClaimsError::Claims(_))
        ));
    }
}
