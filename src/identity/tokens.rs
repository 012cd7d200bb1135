use std::time::Duration;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::config::TokenConfig;

/// Claims carried by an invite token. The subject is the invited email; no
/// user exists yet when it is minted.
#[derive(Debug, Serialize, Deserialize)]
pub struct InviteClaims {
    pub sub: String, // invited email
    pub exp: usize,
    pub iat: usize,
}

/// Claims shared by access and refresh tokens. Refresh tokens carry no
/// expiry claim; the refresh cookie's lifetime bounds client retention.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid, // user ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
    pub iat: usize,
}

/// Expiry is the only failure mode worth distinguishing. A wrong-secret
/// signature and a tampered token are deliberately the same error.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed(#[source] jsonwebtoken::errors::Error),
}

fn into_token_error(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed(e),
    }
}

struct ClassKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl ClassKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Signing and verification keys for the three token classes. Every class
/// has an independent secret, so leaking one cannot forge another class.
pub struct TokenKeys {
    invite: ClassKeys,
    access: ClassKeys,
    refresh: ClassKeys,
    invite_ttl: Duration,
    access_ttl: Duration,
}

impl TokenKeys {
    pub fn new(cfg: &TokenConfig) -> Self {
        Self {
            invite: ClassKeys::from_secret(&cfg.invite_secret),
            access: ClassKeys::from_secret(&cfg.access_secret),
            refresh: ClassKeys::from_secret(&cfg.refresh_secret),
            invite_ttl: cfg.invite_ttl(),
            access_ttl: cfg.access_ttl(),
        }
    }

    pub fn sign_invite(&self, email: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.invite_ttl.as_secs() as i64);
        let claims = InviteClaims {
            sub: email.to_string(),
            exp: exp.unix_timestamp() as usize,
            iat: now.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.invite.encoding)?;
        debug!(email = %email, "invite token signed");
        Ok(token)
    }

    pub fn verify_invite(&self, token: &str) -> Result<InviteClaims, TokenError> {
        decode::<InviteClaims>(token, &self.invite.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(into_token_error)
    }

    fn sign_session(
        &self,
        keys: &ClassKeys,
        user_id: Uuid,
        ttl: Option<Duration>,
    ) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = SessionClaims {
            sub: user_id,
            exp: ttl.map(|ttl| {
                (now + TimeDuration::seconds(ttl.as_secs() as i64)).unix_timestamp() as usize
            }),
            iat: now.unix_timestamp() as usize,
        };
        Ok(encode(&Header::default(), &claims, &keys.encoding)?)
    }

    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        let token = self.sign_session(&self.access, user_id, Some(self.access_ttl))?;
        debug!(user_id = %user_id, "access token signed");
        Ok(token)
    }

    /// Refresh tokens are signed without an expiry claim and are never
    /// rotated; only the cookie that carries them ages out.
    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        let token = self.sign_session(&self.refresh, user_id, None)?;
        debug!(user_id = %user_id, "refresh token signed");
        Ok(token)
    }

    pub fn verify_access(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.access.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(into_token_error)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::default();
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        decode::<SessionClaims>(token, &self.refresh.decoding, &validation)
            .map(|data| data.claims)
            .map_err(into_token_error)
    }
}
