//! Signed bearer tokens (HS256).

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pvz_core::{Role, UserId};

use crate::models::User;
use crate::services::{InternalError, ServiceError};

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    /// Set for synthetic identities that never touch the user store.
    #[serde(default)]
    pub dummy: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Token failures.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, wrong algorithm, expired, or not a token at all.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("failed to encode token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => Self::Unauthorized,
            TokenError::Encoding(e) => Self::Internal(InternalError::TokenEncoding(e)),
        }
    }
}

/// Placeholder email carried by dummy tokens.
#[must_use]
pub fn dummy_email(role: Role) -> String {
    format!("dummy_{role}@example.com")
}

/// Issues and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Tokens issued by this service expire `ttl` after issuance.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();
        // Expiry is exact: no clock skew allowance past `exp`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a token for a registered user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn issue_token(&self, user: &User) -> Result<String, TokenError> {
        self.sign(user.id, user.email.to_string(), user.role, false)
    }

    /// Issue a token for a fresh synthetic identity with `role`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn issue_dummy_token(&self, role: Role) -> Result<String, TokenError> {
        self.sign(UserId::generate(), dummy_email(role), role, true)
    }

    /// Check the signature and expiry of `token` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for any token that does not verify.
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }

    fn sign(
        &self,
        user_id: UserId,
        email: String,
        role: Role,
        dummy: bool,
    ) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            user_id,
            email,
            role,
            dummy,
            iat: now,
            exp: now.saturating_add(ttl),
        };
        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }
}
