use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

/// Role of a token: short-lived access or long-lived refresh.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT payload. `sub` is the user ID whose profile biometrics back the
/// predictions made under this session.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
    pub aud: String,
    pub kind: TokenKind,
}

/// Access + refresh tokens, always minted together: register, login and
/// refresh all hand the client a fresh pair.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Signing and verification material derived from [`JwtConfig`].
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
            refresh_ttl: Duration::from_secs((cfg.refresh_ttl_minutes.max(0) as u64) * 60),
        }
    }

    fn sign(&self, user_id: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            iat: now as usize,
            exp: (now + ttl.as_secs() as i64) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Mint the access/refresh pair returned by every auth endpoint.
    pub fn issue_pair(&self, user_id: Uuid) -> anyhow::Result<TokenPair> {
        let pair = TokenPair {
            access: self.sign(user_id, TokenKind::Access)?,
            refresh: self.sign(user_id, TokenKind::Refresh)?,
        };
        debug!(%user_id, "token pair issued");
        Ok(pair)
    }

    /// Verify signature, issuer, audience and expiry, then require the
    /// expected kind so a refresh token can never act as an access token
    /// (or the reverse).
    pub fn verify(&self, token: &str, expect: TokenKind) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let claims = decode::<Claims>(token, &self.decoding, &validation)?.claims;
        anyhow::ensure!(
            claims.kind == expect,
            "expected {:?} token, got {:?}",
            expect,
            claims.kind
        );
        Ok(claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

/// Extracts the authenticated user ID from a bearer access token.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing bearer token".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "invalid auth scheme".to_string()))?;

        let keys = JwtKeys::from_ref(state);
        match keys.verify(token, TokenKind::Access) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(e) => {
                warn!(error = %e, "bearer token rejected");
                Err((
                    StatusCode::UNAUTHORIZED,
                    "invalid or expired token".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake())
    }

    #[tokio::test]
    async fn pair_verifies_under_matching_kinds() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let pair = keys.issue_pair(user_id).expect("issue pair");

        let access = keys.verify(&pair.access, TokenKind::Access).expect("access");
        assert_eq!(access.sub, user_id);
        assert_eq!(access.iss, "test-issuer");
        assert_eq!(access.aud, "test-aud");

        let refresh = keys
            .verify(&pair.refresh, TokenKind::Refresh)
            .expect("refresh");
        assert_eq!(refresh.sub, user_id);
        assert_eq!(refresh.kind, TokenKind::Refresh);
    }

    #[tokio::test]
    async fn kinds_are_not_interchangeable() {
        let keys = make_keys();
        let pair = keys.issue_pair(Uuid::new_v4()).expect("issue pair");

        let err = keys.verify(&pair.access, TokenKind::Refresh).unwrap_err();
        assert!(err.to_string().contains("expected Refresh"));
        let err = keys.verify(&pair.refresh, TokenKind::Access).unwrap_err();
        assert!(err.to_string().contains("expected Access"));
    }

    #[tokio::test]
    async fn tokens_from_another_secret_are_rejected() {
        let keys = make_keys();
        let other = JwtKeys::from_config(&crate::config::JwtConfig {
            secret: "different-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        });
        let pair = other.issue_pair(Uuid::new_v4()).expect("issue pair");
        assert!(keys.verify(&pair.access, TokenKind::Access).is_err());
    }

    #[tokio::test]
    async fn wire_kind_labels_are_lowercase() {
        // Token kind travels inside the JWT payload; clients inspect it.
        assert_eq!(serde_json::to_string(&TokenKind::Access).unwrap(), "\"access\"");
        assert_eq!(serde_json::to_string(&TokenKind::Refresh).unwrap(), "\"refresh\"");
    }
}
