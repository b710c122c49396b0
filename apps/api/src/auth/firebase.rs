//! Firebase ID token verification against Google's published signing keys.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const KEY_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing or malformed bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Token signed with unknown key id")]
    UnknownKey,

    #[error("Could not fetch signing keys: {0}")]
    Keys(#[from] reqwest::Error),
}

/// Identity extracted from a verified token.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

pub struct FirebaseVerifier {
    client: Client,
    jwks_url: String,
    project_id: String,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    pub fn new(project_id: String, jwks_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            jwks_url: jwks_url.to_string(),
            project_id,
            cache: RwLock::new(None),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{}", self.project_id)]);
        validation
    }

    async fn fetch_keys(&self) -> Result<JwkSet, AuthError> {
        debug!("Fetching identity provider signing keys");
        let keys = self
            .client
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;
        Ok(keys)
    }

    /// Decoding key for `kid`, refreshing the cached key set when stale or when the kid is unknown.
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < KEY_CACHE_TTL {
                    if let Some(jwk) = cached.keys.find(kid) {
                        return Ok(DecodingKey::from_jwk(jwk)?);
                    }
                }
            }
        }

        let keys = self.fetch_keys().await?;
        let key = keys
            .find(kid)
            .map(DecodingKey::from_jwk)
            .transpose()?
            .ok_or(AuthError::UnknownKey);

        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        key
    }
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or(AuthError::UnknownKey)?;
        let key = self.key_for(&kid).await?;

        let data = decode::<FirebaseClaims>(token, &key, &self.validation()).map_err(|e| {
            warn!("Rejected identity token: {e}");
            AuthError::InvalidToken(e)
        })?;

        Ok(VerifiedIdentity {
            uid: data.claims.sub,
            email: data.claims.email,
            email_verified: data.claims.email_verified.unwrap_or(false),
        })
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}

#[cfg(test)]
pub(crate) mod fakes {
    use async_trait::async_trait;

    use super::{AuthError, TokenVerifier, VerifiedIdentity};

    /// Accepts any token and treats it as the account email. `invalid` is rejected.
    pub struct EmailTokenVerifier;

    #[async_trait]
    impl TokenVerifier for EmailTokenVerifier {
        async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
            if token == "invalid" {
                return Err(AuthError::UnknownKey);
            }
            Ok(VerifiedIdentity {
                uid: format!("uid-{token}"),
                email: Some(token.to_string()),
                email_verified: true,
            })
        }
    }
}
