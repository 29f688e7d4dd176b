//! Authentication middleware and role extractors.
//!
//! [`authenticate`] runs in front of every protected route and attaches the
//! caller's [`Identity`] to the request. Handlers then declare which roles
//! they accept with the [`Authorized`] extractor.

use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use pvz_core::Role;
use tracing::Span;

use crate::error::{AppError, set_sentry_user};
use crate::models::Identity;
use crate::services::auth::authorize;
use crate::state::AppState;

/// Middleware that resolves the bearer token into an [`Identity`].
///
/// Rejects the request with 401 if the header is missing, malformed or
/// carries a token that does not verify.
///
/// # Errors
///
/// Returns `AppError` when authentication fails.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let identity = state
        .auth()
        .authenticate(&state.request_scope(), header)
        .await?;

    Span::current().record("user_id", tracing::field::display(identity.user_id));
    set_sentry_user(&identity.user_id, &identity.email);

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Set of roles a route accepts.
pub trait RolePolicy: Send + Sync {
    const ALLOWED: &'static [Role];
}

/// Only moderators.
pub struct ModeratorOnly;

/// Only pickup point employees.
pub struct EmployeeOnly;

/// Any authenticated caller.
pub struct AnyRole;

impl RolePolicy for ModeratorOnly {
    const ALLOWED: &'static [Role] = &[Role::Moderator];
}

impl RolePolicy for EmployeeOnly {
    const ALLOWED: &'static [Role] = &[Role::Employee];
}

impl RolePolicy for AnyRole {
    const ALLOWED: &'static [Role] = Role::ALL;
}

/// Extractor that requires an identity whose role is allowed by `P`.
///
/// # Example
///
/// ```rust,ignore
/// async fn create(Authorized(identity, _): Authorized<ModeratorOnly>) -> impl IntoResponse {
///     format!("hello, {}", identity.email)
/// }
/// ```
pub struct Authorized<P>(pub Identity, pub PhantomData<P>);

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    P: RolePolicy,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = authorize(parts.extensions.get::<Identity>(), P::ALLOWED)?;
        Ok(Self(identity.clone(), PhantomData))
    }
}
