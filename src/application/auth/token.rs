//! HS256 JSON Web Tokens.
//!
//! Tokens are `header.claims.signature`, each part base64url without
//! padding. Only `HS256` is accepted on decode.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::domain::user::Authority;
use crate::error::{AuthError, Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Authorizes requests.
    Access,
    /// Can only be exchanged for a new access token.
    Refresh,
}

impl TokenKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Signed token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Email of the user the token was issued to.
    pub sub: String,
    pub authorities: Vec<Authority>,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    pub typ: TokenKind,
}

/// A freshly signed token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signing key and token lifetimes handed to the auth service.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Encodes and verifies HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self) -> std::result::Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::InvalidToken(format!("invalid signing key: {e}")))
    }

    /// Sign `claims` into a compact token.
    ///
    /// # Errors
    /// Returns an error if the claims cannot be serialized.
    pub fn encode(&self, claims: &Claims) -> Result<String> {
        let header = Header {
            alg: "HS256".into(),
            typ: "JWT".into(),
        };
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
        let claims_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac().map_err(Error::from)?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify the signature of `token` and return its claims.
    ///
    /// The signature is checked before the payload is parsed, and expiry is
    /// checked last, so [`AuthError::Expired`] is only returned for tokens
    /// this codec actually signed.
    ///
    /// # Errors
    /// - [`AuthError::InvalidToken`] for malformed or tampered tokens
    /// - [`AuthError::Expired`] once `now` reaches `exp`
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> std::result::Result<Claims, AuthError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("token must have three segments"));
        };

        let header: Header = decode_segment(header_b64, "header")?;
        if header.alg != "HS256" {
            return Err(invalid(format!("unsupported algorithm `{}`", header.alg)));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| invalid("signature is not base64url"))?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| invalid("signature mismatch"))?;

        let claims: Claims = decode_segment(claims_b64, "claims")?;
        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    /// Build and sign claims for `subject`, valid for `ttl` from `now`.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue(
        &self,
        subject: &str,
        authorities: &[Authority],
        typ: TokenKind,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<IssuedToken> {
        let expires_at = now + ttl;
        let claims = Claims {
            sub: subject.to_string(),
            authorities: authorities.to_vec(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            typ,
        };
        Ok(IssuedToken {
            token: self.encode(&claims)?,
            expires_at: Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .unwrap_or(expires_at),
        })
    }
}

fn invalid(reason: impl Into<String>) -> AuthError {
    AuthError::InvalidToken(reason.into())
}

fn decode_segment<T: for<'de> Deserialize<'de>>(
    segment: &str,
    what: &str,
) -> std::result::Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| invalid(format!("{what} is not base64url")))?;
    serde_json::from_slice(&bytes).map_err(|_| invalid(format!("{what} is not valid JSON")))
}

/// Extract the token from an `Authorization` header value.
///
/// Returns `None` unless the value uses the `Bearer` scheme with a
/// non-empty token.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.trim().strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn access_token(codec: &TokenCodec) -> IssuedToken {
        codec
            .issue(
                "ada@example.com",
                &[Authority::User, Authority::Admin],
                TokenKind::Access,
                now(),
                Duration::minutes(15),
            )
            .unwrap()
    }

    #[test]
    fn issued_token_decodes_to_its_claims() {
        let codec = TokenCodec::new(SECRET);
        let issued = access_token(&codec);
        assert_eq!(issued.expires_at, now() + Duration::minutes(15));

        let claims = codec.decode(&issued.token, now()).unwrap();
        assert_eq!(claims.sub, "ada@example.com");
        assert_eq!(claims.authorities, vec![Authority::User, Authority::Admin]);
        assert_eq!(claims.iat, now().timestamp());
        assert_eq!(claims.typ, TokenKind::Access);
    }

    #[test]
    fn claims_use_role_labels() {
        let codec = TokenCodec::new(SECRET);
        let issued = access_token(&codec);
        let payload = issued.token.split('.').nth(1).unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        assert_eq!(json["authorities"][1], "ROLE_ADMIN");
        assert_eq!(json["typ"], "access");
    }

    #[test]
    fn token_expires_at_exp() {
        let codec = TokenCodec::new(SECRET);
        let issued = access_token(&codec);
        let at_expiry = now() + Duration::minutes(15);
        assert_eq!(codec.decode(&issued.token, at_expiry), Err(AuthError::Expired));
        assert!(codec.decode(&issued.token, at_expiry - Duration::seconds(1)).is_ok());
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let issued = access_token(&TokenCodec::new(SECRET));
        let other = TokenCodec::new(b"another-secret-another-secret-xx".to_vec());
        assert!(matches!(
            other.decode(&issued.token, now()),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = TokenCodec::new(SECRET);
        let issued = access_token(&codec);
        let mut parts: Vec<String> = issued.token.split('.').map(str::to_string).collect();
        let forged = Claims {
            sub: "mallory@example.com".into(),
            authorities: vec![Authority::Admin],
            iat: 0,
            exp: i64::MAX,
            typ: TokenKind::Access,
        };
        parts[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        assert!(matches!(
            codec.decode(&parts.join("."), now()),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn malformed_tokens_are_invalid_not_expired() {
        let codec = TokenCodec::new(SECRET);
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.**"] {
            assert!(
                matches!(codec.decode(token, now()), Err(AuthError::InvalidToken(_))),
                "{token:?} should be invalid"
            );
        }
    }

    #[test]
    fn bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("  Bearer   abc  "), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }
}
