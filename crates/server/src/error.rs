//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures internal errors to Sentry
//! before responding to the client. All route handlers return `Result<T, AppError>`.
//! Every error body has the shape `{"message": "..."}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::ServiceError;

/// Application-level error type for the HTTP surface.
#[derive(Debug, Error)]
pub enum AppError {
    /// A workflow or identity operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Metrics could not be rendered.
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl AppError {
    /// Shorthand for a malformed request.
    #[must_use]
    pub const fn invalid_input(message: &'static str) -> Self {
        Self::Service(ServiceError::InvalidInput(message))
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => match err {
                ServiceError::InvalidInput(_)
                | ServiceError::NotFound
                | ServiceError::ConflictAlreadyOpen
                | ServiceError::NoOpenReception
                | ServiceError::NoProductsToDelete
                | ServiceError::AlreadyExists => StatusCode::BAD_REQUEST,
                ServiceError::InvalidCredentials | ServiceError::Unauthorized => {
                    StatusCode::UNAUTHORIZED
                }
                ServiceError::Forbidden => StatusCode::FORBIDDEN,
                ServiceError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ServiceError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn is_internal(&self) -> bool {
        match self {
            Self::Service(err) => err.is_internal(),
            Self::Metrics(_) => true,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected request body");
        Self::invalid_input("invalid request body")
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected query string");
        Self::invalid_input("invalid query parameters")
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected path parameters");
        Self::invalid_input("invalid path parameters")
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_internal() {
            let event_id = sentry::capture_error(&self);
            let cause = match &self {
                Self::Service(ServiceError::Internal(inner)) => inner.to_string(),
                other => other.to_string(),
            };
            tracing::error!(
                error = %cause,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if self.is_internal() {
            "internal server error".to_owned()
        } else {
            self.to_string()
        };

        (self.status(), Json(ErrorBody { message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
///
/// Associates errors captured later in the request with the user.
pub fn set_sentry_user(user_id: &impl ToString, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: Some(email.to_owned()),
            ..Default::default()
        }));
    });
}
