//! Reception routes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use pvz_core::PickupPointId;
use serde::Deserialize;

use super::extract::{JsonBody, PathParam, parse_pvz_id};
use crate::error::Result;
use crate::middleware::{Authorized, EmployeeOnly};
use crate::models::Reception;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenReceptionRequest {
    pub pvz_id: PickupPointId,
}

/// Open a reception at a pickup point.
#[tracing::instrument(skip_all)]
pub async fn open(
    State(state): State<AppState>,
    Authorized(_, _): Authorized<EmployeeOnly>,
    JsonBody(req): JsonBody<OpenReceptionRequest>,
) -> Result<(StatusCode, Json<Reception>)> {
    let reception = state
        .workflow()
        .open_reception(&state.request_scope(), req.pvz_id)
        .await?;
    Ok((StatusCode::CREATED, Json(reception)))
}

/// Close the open reception of a pickup point.
#[tracing::instrument(skip_all)]
pub async fn close_last(
    State(state): State<AppState>,
    Authorized(_, _): Authorized<EmployeeOnly>,
    PathParam(pvz_id): PathParam<String>,
) -> Result<Json<Reception>> {
    let pvz_id = parse_pvz_id(&pvz_id)?;
    let reception = state
        .workflow()
        .close_last_reception(&state.request_scope(), pvz_id)
        .await?;
    Ok(Json(reception))
}
