use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;
use crate::middleware::AuthUser;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user id every owned row is stamped with
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    pub fn new(sub: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: sub.into(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: None,
            aud: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,

    #[error("Empty bearer token")]
    EmptyToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Token has no subject")]
    MissingSubject,

    #[error("Invalid verification key: {0}")]
    KeyConfig(String),
}

/// Turns a bearer credential into the acting user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError>;
}

/// Verifies JWTs locally with either a shared secret or the issuer's public key
pub struct JwtIdentity {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentity {
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let (key, algorithm) = match (&config.jwt_public_key, &config.jwt_secret) {
            (Some(pem), _) => {
                // Keys passed through env files often carry escaped newlines
                let pem = pem.replace("\\n", "\n");
                let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| AuthError::KeyConfig(e.to_string()))?;
                (key, Algorithm::RS256)
            }
            (None, Some(secret)) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            (None, None) => return Err(AuthError::KeyConfig("no verification key configured".into())),
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_secs;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self { key, validation })
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentity {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        let user_id = data.claims.sub.trim();
        if user_id.is_empty() {
            return Err(AuthError::MissingSubject);
        }
        Ok(AuthUser {
            user_id: user_id.to_string(),
        })
    }
}

/// Sign an HS256 token for `user_id`. Development and test use only; production
/// tokens come from the identity provider.
pub fn issue_token(secret: &str, user_id: &str, ttl: Duration) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::KeyConfig("empty signing secret".into()));
    }
    let claims = Claims::new(user_id, ttl);
    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))?)
}
