//! Registration and login routes.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use super::extract::JsonBody;
use crate::error::Result;
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DummyLoginRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Issue a token for a synthetic user with the requested role.
#[tracing::instrument(skip_all)]
pub async fn dummy_login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<DummyLoginRequest>,
) -> Result<Json<TokenResponse>> {
    let token = state.auth().dummy_login(&req.role)?;
    Ok(Json(TokenResponse { token }))
}

/// Register a new operator account.
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state
        .auth()
        .register(&state.request_scope(), &req.email, &req.password, &req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange credentials for a token.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let token = state
        .auth()
        .login(&state.request_scope(), &req.email, &req.password)
        .await?;
    Ok(Json(TokenResponse { token }))
}
