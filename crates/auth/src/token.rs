//! JWT codec for access, refresh and password-reset tokens.
//!
//! All tokens are HS256-signed. Access and password-reset tokens are signed
//! with the access secret; refresh tokens with the refresh secret, so a leaked
//! access secret cannot mint refresh tokens. The `type` claim tells the
//! verifier which secret to use.

use std::time::Duration;

use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// `type` claim of access and password-reset tokens.
pub const ACCESS_TOKEN_TYPE: &str = "at";
/// `type` claim of refresh tokens.
pub const REFRESH_TOKEN_TYPE: &str = "rt";

/// Claims carried by every token this codec issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// [`ACCESS_TOKEN_TYPE`] or [`REFRESH_TOKEN_TYPE`].
    #[serde(rename = "type", default)]
    pub token_type: String,
    /// Session `jti` for refresh tokens, reset-request id for reset tokens.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub jti: String,
    /// Target address, reset tokens only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub for_reset_password: bool,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Claims {
    pub fn is_for_refresh_token(&self) -> bool {
        self.token_type == REFRESH_TOKEN_TYPE
    }

    pub fn is_for_reset_password(&self) -> bool {
        self.for_reset_password
    }
}

/// Only the `type` claim, read before the signature is checked.
#[derive(Debug, Deserialize)]
struct TypeProbe {
    #[serde(rename = "type", default)]
    token_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token: unexpected signing method {0:?}, want HS256")]
    UnexpectedAlgorithm(Algorithm),

    #[error("invalid token: unknown token type {0:?}")]
    UnknownType(String),
}

/// Issues and verifies tokens.
pub trait TokenCodec: Send + Sync {
    /// Issue a token expiring `ttl` from now.
    ///
    /// | `id`  | `email` | Result                                    |
    /// |-------|---------|-------------------------------------------|
    /// | empty | any     | access token                              |
    /// | set   | set     | password-reset token (access secret)      |
    /// | set   | empty   | refresh token with `jti = id`             |
    fn generate(&self, ttl: Duration, id: &str, email: &str) -> Result<String, TokenError>;

    /// Verify signature, algorithm and expiry, returning the claims.
    fn validate(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 [`TokenCodec`] with one secret per token type.
#[derive(Clone)]
pub struct JwtCodec {
    access_secret: Vec<u8>,
    refresh_secret: Vec<u8>,
}

impl JwtCodec {
    pub fn new(access_secret: impl Into<Vec<u8>>, refresh_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
        }
    }

    fn secret_for(&self, token_type: &str) -> Option<&[u8]> {
        match token_type {
            ACCESS_TOKEN_TYPE => Some(&self.access_secret),
            REFRESH_TOKEN_TYPE => Some(&self.refresh_secret),
            _ => None,
        }
    }

    fn sign(&self, claims: &Claims, secret: &[u8]) -> Result<String, TokenError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(TokenError::Encoding)
    }
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec").finish_non_exhaustive()
    }
}

impl TokenCodec for JwtCodec {
    fn generate(&self, ttl: Duration, id: &str, email: &str) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let mut claims = Claims {
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            jti: String::new(),
            email: String::new(),
            for_reset_password: false,
            iat: now,
            exp: now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
        };
        let mut secret = self.access_secret.as_slice();

        if !id.is_empty() {
            claims.jti = id.to_string();
            if email.is_empty() {
                claims.token_type = REFRESH_TOKEN_TYPE.to_string();
                secret = &self.refresh_secret;
            } else {
                claims.email = email.to_string();
                claims.for_reset_password = true;
            }
        }

        self.sign(&claims, secret)
    }

    fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(TokenError::Invalid)?;
        if header.alg != Algorithm::HS256 {
            return Err(TokenError::UnexpectedAlgorithm(header.alg));
        }

        // Read the declared type without trusting it; it only selects the key.
        let mut probe = Validation::new(Algorithm::HS256);
        probe.insecure_disable_signature_validation();
        probe.validate_exp = false;
        probe.required_spec_claims.clear();
        let declared = decode::<TypeProbe>(token, &DecodingKey::from_secret(b""), &probe)
            .map_err(TokenError::Invalid)?
            .claims
            .token_type;

        let secret = self
            .secret_for(&declared)
            .ok_or_else(|| TokenError::UnknownType(declared.clone()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
            .map_err(TokenError::Invalid)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const TTL: Duration = Duration::from_secs(15 * 60);

    fn codec() -> JwtCodec {
        JwtCodec::new("access-secret-for-tests", "refresh-secret-for-tests")
    }

    #[test]
    fn access_token_round_trip() {
        let codec = codec();
        let token = codec.generate(TTL, "", "").expect("generation should succeed");
        let claims = codec.validate(&token).expect("validation should succeed");

        assert_eq!(claims.token_type, ACCESS_TOKEN_TYPE);
        assert!(claims.jti.is_empty());
        assert!(claims.email.is_empty());
        assert!(!claims.is_for_refresh_token());
        assert!(!claims.is_for_reset_password());
        assert_eq!(claims.exp - claims.iat, TTL.as_secs() as i64);
    }

    #[test]
    fn refresh_token_round_trip() {
        let codec = codec();
        let token = codec.generate(TTL, "jti-123", "").unwrap();
        let claims = codec.validate(&token).unwrap();

        assert_eq!(claims.token_type, REFRESH_TOKEN_TYPE);
        assert_eq!(claims.jti, "jti-123");
        assert!(claims.email.is_empty());
        assert!(claims.is_for_refresh_token());
        assert!(!claims.is_for_reset_password());
    }

    #[test]
    fn reset_token_round_trip() {
        let codec = codec();
        let token = codec.generate(TTL, "reset-1", "owner@example.com").unwrap();
        let claims = codec.validate(&token).unwrap();

        assert_eq!(claims.token_type, ACCESS_TOKEN_TYPE);
        assert_eq!(claims.jti, "reset-1");
        assert_eq!(claims.email, "owner@example.com");
        assert!(claims.is_for_reset_password());
        assert!(!claims.is_for_refresh_token());
    }

    #[test]
    fn expired_token_fails() {
        let codec = codec();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            token_type: ACCESS_TOKEN_TYPE.into(),
            jti: String::new(),
            email: String::new(),
            for_reset_password: false,
            iat: now - 600,
            exp: now - 5,
        };
        let token = codec.sign(&claims, b"access-secret-for-tests").unwrap();

        assert_matches!(codec.validate(&token), Err(TokenError::Invalid(_)));
    }

    #[test]
    fn token_expires_once_ttl_elapses() {
        let codec = codec();
        let token = codec.generate(Duration::from_secs(1), "", "").unwrap();
        assert!(codec.validate(&token).is_ok());

        std::thread::sleep(Duration::from_millis(2100));
        assert_matches!(codec.validate(&token), Err(TokenError::Invalid(_)));
    }

    #[test]
    fn access_claims_under_refresh_type_fail() {
        // An access-secret signature presented as a refresh token is checked
        // against the refresh secret and must not verify.
        let codec = codec();
        let now = chrono::Utc::now().timestamp();
        let forged = Claims {
            token_type: REFRESH_TOKEN_TYPE.into(),
            jti: "jti-1".into(),
            email: String::new(),
            for_reset_password: false,
            iat: now,
            exp: now + 600,
        };
        let token = codec.sign(&forged, b"access-secret-for-tests").unwrap();
        assert_matches!(codec.validate(&token), Err(TokenError::Invalid(_)));
    }

    #[test]
    fn refresh_secret_under_access_type_fails() {
        let codec = codec();
        let now = chrono::Utc::now().timestamp();
        let forged = Claims {
            token_type: ACCESS_TOKEN_TYPE.into(),
            jti: String::new(),
            email: String::new(),
            for_reset_password: false,
            iat: now,
            exp: now + 600,
        };
        let token = codec.sign(&forged, b"refresh-secret-for-tests").unwrap();
        assert_matches!(codec.validate(&token), Err(TokenError::Invalid(_)));
    }

    #[test]
    fn unknown_type_fails_closed() {
        let codec = codec();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            token_type: "xx".into(),
            jti: String::new(),
            email: String::new(),
            for_reset_password: false,
            iat: now,
            exp: now + 600,
        };
        let token = codec.sign(&claims, b"").unwrap();
        assert_matches!(codec.validate(&token), Err(TokenError::UnknownType(t)) if t == "xx");
    }

    #[test]
    fn non_hs256_header_is_rejected() {
        let codec = codec();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            token_type: ACCESS_TOKEN_TYPE.into(),
            jti: String::new(),
            email: String::new(),
            for_reset_password: false,
            iat: now,
            exp: now + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"access-secret-for-tests"),
        )
        .unwrap();
        assert_matches!(
            codec.validate(&token),
            Err(TokenError::UnexpectedAlgorithm(Algorithm::HS512))
        );
    }

    #[test]
    fn different_secrets_fail() {
        let token = codec().generate(TTL, "", "").unwrap();
        let other = JwtCodec::new("another-access-secret", "refresh-secret-for-tests");
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn garbage_is_invalid() {
        assert_matches!(codec().validate("not.a.jwt"), Err(TokenError::Invalid(_)));
        assert_matches!(codec().validate(""), Err(TokenError::Invalid(_)));
    }
}
