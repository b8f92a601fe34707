//! HS256 token codec for access/refresh token pairs.
//!
//! Tokens carry `sub` (user id), `kind`, `iat`, `exp` and a random `jti`, so
//! two pairs issued for the same user in the same second still differ.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::contract::model::TokenPair;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"***")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue(&self, user_id: &str, kind: TokenKind) -> Result<String, DomainError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let now = Utc::now().timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = TokenClaims {
            sub: user_id.to_string(),
            kind,
            iat: now,
            exp: now.saturating_add(ttl_secs),
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(&claims)
    }

    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, DomainError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenKind::Access)?,
            refresh_token: self.issue(user_id, TokenKind::Refresh)?,
        })
    }

    /// Check signature, expiry and kind. Every failure is `Unauthorized`.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, DomainError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(error = %e, "token rejected");
            DomainError::Unauthorized
        })?;
        if data.claims.kind != expected {
            debug!(kind = ?data.claims.kind, ?expected, "token kind mismatch");
            return Err(DomainError::Unauthorized);
        }
        Ok(data.claims)
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| DomainError::unknown(format!("token signing failed: {e}")))
    }
}
