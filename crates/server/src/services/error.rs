//! Service-level error taxonomy.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors surfaced by the workflow and identity services.
///
/// The `Display` text of every variant is the stable message shown to
/// callers. [`ServiceError::Internal`] keeps its cause as the error source
/// for logging only.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or unrecognized input value.
    #[error("{0}")]
    InvalidInput(&'static str),

    /// The referenced pickup point does not exist.
    #[error("pvz not found")]
    NotFound,

    /// The pickup point already has an open reception.
    #[error("open reception already exists")]
    ConflictAlreadyOpen,

    #[error("no open reception found")]
    NoOpenReception,

    #[error("no products to delete")]
    NoProductsToDelete,

    /// Registration with an email that is already taken.
    #[error("user already exists")]
    AlreadyExists,

    /// Unknown email or wrong password. The two are never distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed or expired token, or unknown user.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated, but the role is not allowed.
    #[error("access denied")]
    Forbidden,

    /// The request deadline passed before the operation finished.
    #[error("request timed out")]
    Timeout,

    /// The request was cancelled before the operation finished.
    #[error("request cancelled")]
    Cancelled,

    /// Unexpected failure. Details never leave the process.
    #[error("internal server error")]
    Internal(#[source] InternalError),
}

impl ServiceError {
    /// Returns `true` for failures that should be logged and reported.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Causes of [`ServiceError::Internal`].
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("token encoding failed: {0}")]
    TokenEncoding(#[source] jsonwebtoken::errors::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        Self::Internal(InternalError::Repository(err))
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(InternalError::Join(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_message_hides_cause() {
        let err = ServiceError::from(RepositoryError::DataCorruption("bad row".to_owned()));

        assert!(err.is_internal());
        assert_eq!(err.to_string(), "internal server error");

        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("repository error: data corruption: bad row"));
    }

    #[test]
    fn test_domain_messages_are_stable() {
        assert_eq!(ServiceError::NotFound.to_string(), "pvz not found");
        assert_eq!(
            ServiceError::NoOpenReception.to_string(),
            "no open reception found"
        );
        assert_eq!(
            ServiceError::InvalidInput("invalid city").to_string(),
            "invalid city"
        );
        assert!(!ServiceError::Forbidden.is_internal());
    }
}
