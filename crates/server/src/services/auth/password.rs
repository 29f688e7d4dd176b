//! Argon2id password hashing.
//!
//! Hashing is CPU-bound; the async helpers run it on the blocking pool so
//! no transaction or executor thread is held while it works.

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tokio::sync::OnceCell;

use crate::services::{InternalError, ServiceError};

/// Memory cost in KiB (64 MiB).
const MEMORY_KIB: u32 = 64 * 1024;
const ITERATIONS: u32 = 3;
const PARALLELISM: u32 = 2;
const OUTPUT_LEN: usize = 32;

/// Plaintext behind the decoy hash checked for unknown accounts.
const DECOY_PASSWORD: &str = "pvz-decoy-password";

/// Salted one-way password hashing with PHC string output.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of [`DECOY_PASSWORD`] under `params`, built on first use.
    decoy: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    /// Hasher with explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `argon2::Error` if the parameters are out of range.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, argon2::Error> {
        let params = Params::new(memory_kib, iterations, parallelism, Some(OUTPUT_LEN))?;
        Ok(Self {
            params,
            decoy: Arc::new(OnceCell::new()),
        })
    }

    /// Hasher with the production cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `argon2::Error` if the parameters are out of range.
    pub fn production() -> Result<Self, argon2::Error> {
        Self::new(MEMORY_KIB, ITERATIONS, PARALLELISM)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `password` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Internal` if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(hash_failure)
    }

    /// Check `password` against a stored PHC hash.
    ///
    /// The cost parameters are read from the hash itself.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Internal` if the stored hash is unreadable.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, ServiceError> {
        let parsed = PasswordHash::new(hash).map_err(hash_failure)?;
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(hash_failure(e)),
        }
    }

    /// [`Self::hash`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Internal` if hashing fails or the task panics.
    pub async fn hash_blocking(&self, password: String) -> Result<String, ServiceError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    /// [`Self::verify`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Internal` if the hash is unreadable or the task panics.
    pub async fn verify_blocking(
        &self,
        password: String,
        hash: String,
    ) -> Result<bool, ServiceError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?
    }

    /// Spend the same work as [`Self::verify_blocking`] when there is no
    /// stored hash to check, so a missing account costs as much as a wrong
    /// password.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Internal` if hashing fails or the task panics.
    pub async fn verify_decoy_blocking(&self, password: String) -> Result<(), ServiceError> {
        let decoy = self
            .decoy
            .get_or_try_init(|| self.hash_blocking(DECOY_PASSWORD.to_owned()))
            .await?
            .clone();
        self.verify_blocking(password, decoy).await.map(|_| ())
    }

    #[cfg(test)]
    pub(super) fn decoy_ready(&self) -> bool {
        self.decoy.initialized()
    }
}

fn hash_failure(err: password_hash::Error) -> ServiceError {
    ServiceError::Internal(InternalError::PasswordHash(err.to_string()))
}
