pub mod guard;
pub mod password;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

pub use guard::{require_admin, require_authenticated, require_self_or_admin, Unauthorized};
pub use password::{PasswordError, PasswordHasher};

/// Verified identity and role carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationClaims {
    pub username: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
    /// Random per token.
    pub jti: String,
}

impl AuthorizationClaims {
    pub fn new(username: impl Into<String>, is_admin: bool, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            username: username.into(),
            is_admin,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Malformed token")]
    Malformed,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token signature")]
    Tampered,
}

/// Issues and verifies HS256 tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, TokenError> {
        Self::new(&security.jwt_secret, Duration::hours(security.jwt_expiry_hours as i64))
    }

    pub fn issue(&self, username: &str, is_admin: bool) -> Result<String, TokenError> {
        self.issue_at(username, is_admin, Utc::now())
    }

    pub fn issue_at(&self, username: &str, is_admin: bool, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = AuthorizationClaims::new(username, is_admin, issued_at, self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::TokenGeneration(e.to_string()))
    }

    /// Signature is checked before expiry; a forged token never reports `Expired`.
    pub fn verify(&self, token: &str) -> Result<AuthorizationClaims, TokenError> {
        let token_data = decode::<AuthorizationClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::Tampered,
                _ => TokenError::Malformed,
            })?;

        Ok(token_data.claims)
    }
}
