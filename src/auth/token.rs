//! Auth tokens and the `pb_auth` cookie

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Cookie the web client stores its auth state in
pub const AUTH_COOKIE: &str = "pb_auth";

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Invalid token claims: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Claims carried in a backend auth token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// Id of the authenticated record
    pub id: String,
    /// Expiry, seconds since the epoch
    #[serde(default)]
    pub exp: i64,
    #[serde(default, rename = "collectionId", skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Read the claims of a JWT without checking its signature.
///
/// The result is never an identity on its own: it only lets obviously
/// malformed or expired tokens be dropped before the backend confirms the
/// token through `auth_refresh`.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut parts = token.trim().split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(TokenError::Malformed),
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Auth state persisted by the web client
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthCookie {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub model: Option<Value>,
}

impl AuthCookie {
    /// Parse the URL-encoded JSON value of the `pb_auth` cookie
    pub fn parse(raw: &str) -> Option<Self> {
        let decoded = urlencoding::decode(raw.trim()).ok()?;
        let cookie: AuthCookie = serde_json::from_str(&decoded).ok()?;
        if cookie.token.is_empty() {
            None
        } else {
            Some(cookie)
        }
    }
}

/// Find a cookie value in a `Cookie` header
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Assemble a JWT-shaped token from a claims object and signature segment
pub(crate) fn encode_token(claims: &Value, signature: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.{}", header, payload, signature)
}

/// Build an unsigned token for the given claims
#[cfg(test)]
pub(crate) fn unsigned_token(claims: &TokenClaims) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
    format!("{}.{}.sig", header, payload)
}

/// Unsigned token for `user_id` expiring in one hour
#[cfg(test)]
pub(crate) fn test_token(user_id: &str) -> String {
    unsigned_token(&TokenClaims {
        id: user_id.to_string(),
        exp: Utc::now().timestamp() + 3600,
        collection_id: None,
        kind: Some("authRecord".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_claims() {
        let token = test_token("user123");
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.id, "user123");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expired_claims() {
        let token = unsigned_token(&TokenClaims {
            id: "u1".to_string(),
            exp: 1_000,
            collection_id: None,
            kind: None,
        });
        let claims = decode_claims(&token).unwrap();
        assert!(claims.is_expired());
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_000);
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(decode_claims("abc"), Err(TokenError::Malformed)));
        assert!(matches!(decode_claims("a..c"), Err(TokenError::Malformed)));
        assert!(decode_claims("a.!!!.c").is_err());
    }

    #[test]
    fn test_parse_auth_cookie() {
        let json = r#"{"token":"t.o.k","model":{"id":"u1","user_type":"carrier"}}"#;
        let raw = urlencoding::encode(json);
        let cookie = AuthCookie::parse(&raw).unwrap();
        assert_eq!(cookie.token, "t.o.k");
        assert_eq!(cookie.model.unwrap()["user_type"], "carrier");

        assert!(AuthCookie::parse(&urlencoding::encode(r#"{"token":""}"#)).is_none());
        assert!(AuthCookie::parse("not-json").is_none());
    }

    #[test]
    fn test_cookie_value() {
        let header = "theme=dark; pb_auth=abc%7B; other=1";
        assert_eq!(cookie_value(header, AUTH_COOKIE), Some("abc%7B"));
        assert_eq!(cookie_value(header, "missing"), None);
    }
}
