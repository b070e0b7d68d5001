//! HS256 JWT issuance and verification for access and refresh tokens.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::warn;
use uuid::Uuid;

use crate::config::SecurityConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    /// Makes every token unique, even two issued in the same second.
    pub jti: String,
}

impl Claims {
    #[must_use]
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Expiry as a sortable RFC 3339 string, the format stored in the database.
    #[must_use]
    pub fn expires_at_rfc3339(&self) -> String {
        self.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Builds an issuer from config. An empty secret gets a random one that
    /// lives only as long as the process.
    #[must_use]
    pub fn from_config(security: &SecurityConfig) -> Self {
        let secret = if security.jwt_secret.is_empty() {
            warn!(
                event = "ephemeral_jwt_secret",
                "security.jwt_secret is empty; generated a temporary secret, sessions will not survive a restart"
            );
            generate_secret()
        } else {
            security.jwt_secret.clone()
        };

        Self::new(
            secret.as_bytes(),
            Duration::minutes(i64::from(security.access_token_ttl_minutes)),
            Duration::days(i64::from(security.refresh_token_ttl_days)),
        )
    }

    #[must_use]
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    pub fn issue(&self, user_id: i32, kind: TokenKind) -> Result<IssuedToken> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let expires_at = now + ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("Failed to sign token")?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Checks signature, expiry and kind. Returns `None` for any invalid token.
    #[must_use]
    pub fn verify(&self, token: &str, kind: TokenKind) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).ok()?;
        (data.claims.kind == kind).then_some(data.claims)
    }
}

/// 32 random bytes, hex encoded.
#[must_use]
pub fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret", Duration::minutes(15), Duration::days(7))
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let issuer = issuer();
        let issued = issuer.issue(42, TokenKind::Access).unwrap();

        let claims = issuer.verify(&issued.token, TokenKind::Access).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let issuer = issuer();
        let refresh = issuer.issue(1, TokenKind::Refresh).unwrap();

        assert!(issuer.verify(&refresh.token, TokenKind::Access).is_none());
        assert!(issuer.verify(&refresh.token, TokenKind::Refresh).is_some());
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let other = TokenIssuer::new(b"other-secret", Duration::minutes(15), Duration::days(7));
        let token = other.issue(1, TokenKind::Access).unwrap();

        assert!(issuer().verify(&token.token, TokenKind::Access).is_none());
        assert!(issuer().verify("not-a-jwt", TokenKind::Access).is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = TokenIssuer::new(b"test-secret", Duration::minutes(-5), Duration::days(7));
        let token = issuer.issue(1, TokenKind::Access).unwrap();

        assert!(issuer.verify(&token.token, TokenKind::Access).is_none());
    }

    #[test]
    fn test_tokens_are_unique() {
        let issuer = issuer();
        let a = issuer.issue(1, TokenKind::Refresh).unwrap();
        let b = issuer.issue(1, TokenKind::Refresh).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_generate_secret() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
