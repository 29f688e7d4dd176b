//! Authentication service.
//!
//! Provides registration, password login, dummy login, and resolution of
//! bearer tokens into caller identities.

mod access;
mod password;
mod token;

pub use access::authorize;
pub use password::PasswordHasher;
pub use token::{Claims, TokenError, TokenService, dummy_email};

use std::sync::Arc;

use pvz_core::{Email, Role, UserId};

use crate::db::{RepositoryError, Store};
use crate::models::{Identity, NewUser, User};
use crate::services::{RequestScope, ServiceError};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Authorization scheme expected in the `Authorization` header.
const BEARER_SCHEME: &str = "Bearer";

/// Authentication service.
///
/// Handles user registration, login, and token-based authentication.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: TokenService,
    hasher: PasswordHasher,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, hasher: PasswordHasher) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new user with email, password and role.
    ///
    /// The password is hashed before the transaction starts.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidInput` if the email, password or role is invalid.
    /// Returns `ServiceError::AlreadyExists` if the email is already registered.
    #[tracing::instrument(skip(self, scope, password))]
    pub async fn register(
        &self,
        scope: &RequestScope,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<User, ServiceError> {
        let email = Email::parse(email).map_err(|_| ServiceError::InvalidInput("invalid email"))?;
        validate_password(password)?;
        let role = parse_role(role)?;

        let user = scope
            .run(async {
                let password_hash = self.hasher.hash_blocking(password.to_owned()).await?;
                let new_user = NewUser {
                    id: UserId::generate(),
                    email,
                    password_hash,
                    role,
                };

                let mut tx = self.store.begin().await?;
                let user = tx.create_user(&new_user).await.map_err(|e| match e {
                    RepositoryError::Conflict(_) => ServiceError::AlreadyExists,
                    other => other.into(),
                })?;
                tx.commit().await?;
                Ok::<_, ServiceError>(user)
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Login with email and password and return a signed token.
    ///
    /// An unknown email and a wrong password fail identically.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidInput` if the email is malformed.
    /// Returns `ServiceError::InvalidCredentials` if the email/password is wrong.
    #[tracing::instrument(skip(self, scope, password))]
    pub async fn login(
        &self,
        scope: &RequestScope,
        email: &str,
        password: &str,
    ) -> Result<String, ServiceError> {
        let email = Email::parse(email).map_err(|_| ServiceError::InvalidInput("invalid email"))?;

        let user = scope
            .run(async {
                let found = {
                    let mut tx = self.store.begin().await?;
                    let found = match tx.get_user_by_email(&email).await {
                        Ok(user) => Some(user),
                        Err(RepositoryError::NotFound) => None,
                        Err(other) => return Err(ServiceError::from(other)),
                    };
                    tx.commit().await?;
                    found
                };
                let Some(user) = found else {
                    self.hasher
                        .verify_decoy_blocking(password.to_owned())
                        .await?;
                    return Err(ServiceError::InvalidCredentials);
                };

                let verified = self
                    .hasher
                    .verify_blocking(password.to_owned(), user.password_hash.clone())
                    .await?;
                if !verified {
                    return Err(ServiceError::InvalidCredentials);
                }
                Ok::<_, ServiceError>(user)
            })
            .await
            .inspect_err(|e| {
                if matches!(e, ServiceError::InvalidCredentials) {
                    tracing::debug!("login rejected");
                }
            })?;

        let token = self.tokens.issue_token(&user)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    /// Issue a token for a synthetic identity with `role`. No store access.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidInput` if `role` is not a known role.
    pub fn dummy_login(&self, role: &str) -> Result<String, ServiceError> {
        let role = parse_role(role)?;
        let token = self.tokens.issue_dummy_token(role)?;
        tracing::debug!(role = %role, "dummy token issued");
        Ok(token)
    }

    /// Resolve an `Authorization` header value into the caller's identity.
    ///
    /// Dummy tokens resolve from their claims alone; every other token is
    /// checked against the user store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Unauthorized` if the header is missing or
    /// malformed, the token does not verify, or the user no longer exists.
    pub async fn authenticate(
        &self,
        scope: &RequestScope,
        header: Option<&str>,
    ) -> Result<Identity, ServiceError> {
        let token = bearer_token(header.ok_or(ServiceError::Unauthorized)?)?;
        let claims = self.tokens.verify_token(token)?;

        if claims.dummy {
            return Ok(Identity {
                user_id: claims.user_id,
                email: claims.email,
                role: claims.role,
                dummy: true,
            });
        }

        let user = scope
            .run(async {
                let mut tx = self.store.begin().await?;
                let user = tx
                    .get_user_by_id(claims.user_id)
                    .await
                    .map_err(|e| match e {
                        RepositoryError::NotFound => ServiceError::Unauthorized,
                        other => other.into(),
                    })?;
                tx.commit().await?;
                Ok::<_, ServiceError>(user)
            })
            .await?;

        Ok(Identity {
            user_id: user.id,
            email: user.email.into_inner(),
            role: user.role,
            dummy: false,
        })
    }
}

/// Extract the token from a `Bearer <token>` header value.
fn bearer_token(header: &str) -> Result<&str, ServiceError> {
    match header.split(' ').collect::<Vec<_>>().as_slice() {
        [BEARER_SCHEME, token] if !token.is_empty() => Ok(*token),
        _ => Err(ServiceError::Unauthorized),
    }
}

fn parse_role(role: &str) -> Result<Role, ServiceError> {
    role.parse()
        .map_err(|_| ServiceError::InvalidInput("invalid role"))
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `ServiceError::InvalidInput` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::InvalidInput("password too short"));
    }
    Ok(())
}
