//! Access-token claim decoding.
//!
//! Tokens are only decoded, never verified: the server is the authority and
//! the client just needs the expiry and the user identity for display.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims carried by the API's JWT access tokens
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claims {
    /// Expiry as Unix timestamp (seconds)
    pub exp: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Expired at or before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Best display name available in the claims
    pub fn display_name(&self) -> String {
        match (&self.username, self.user_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("user #{}", id),
            (None, None) => "unknown user".to_string(),
        }
    }
}

/// Decode the payload segment of a JWT. Returns `None` for anything malformed.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(payload);
        let signature = URL_SAFE_NO_PAD.encode("fake-signature");
        format!("{}.{}.{}", header, payload, signature)
    }

    #[test]
    fn test_decode_valid_claims() {
        let exp = Utc::now().timestamp() + 3600;
        let token = make_token(&format!(
            r#"{{"exp":{},"user_id":3,"username":"alice","token_type":"access"}}"#,
            exp
        ));

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.exp, exp);
        assert_eq!(claims.user_id, Some(3));
        assert_eq!(claims.display_name(), "alice");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expired_token() {
        let exp = Utc::now().timestamp() - 60;
        let token = make_token(&format!(r#"{{"exp":{}}}"#, exp));
        assert!(decode_claims(&token).unwrap().is_expired());
    }

    #[test]
    fn test_malformed_tokens_do_not_decode() {
        assert!(decode_claims("not-a-jwt").is_none());
        assert!(decode_claims("only.two").is_none());
        assert!(decode_claims("a.b.c.d").is_none());
        assert!(decode_claims("header.!!!invalid-base64!!!.signature").is_none());
        assert!(decode_claims("").is_none());
    }

    #[test]
    fn test_missing_exp_claim() {
        let token = make_token(r#"{"user_id":3}"#);
        assert!(decode_claims(&token).is_none());
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut claims = decode_claims(&make_token(r#"{"exp":1,"user_id":9}"#)).unwrap();
        assert_eq!(claims.display_name(), "user #9");
        claims.user_id = None;
        assert_eq!(claims.display_name(), "unknown user");
    }

    #[test]
    fn test_expiry_boundary() {
        let claims = decode_claims(&make_token(r#"{"exp":1000}"#)).unwrap();
        let at = |ts| DateTime::from_timestamp(ts, 0).unwrap();
        assert!(!claims.is_expired_at(at(999)));
        assert!(claims.is_expired_at(at(1000)));
        assert_eq!(claims.expires_at(), Some(at(1000)));
    }
}
