//! Product routes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use pvz_core::PickupPointId;
use serde::{Deserialize, Serialize};

use super::extract::{JsonBody, PathParam, parse_pvz_id};
use crate::error::Result;
use crate::middleware::{Authorized, EmployeeOnly};
use crate::models::Product;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductRequest {
    #[serde(rename = "type")]
    pub product_type: String,
    pub pvz_id: PickupPointId,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Add a product to the open reception of a pickup point.
#[tracing::instrument(skip_all)]
pub async fn add(
    State(state): State<AppState>,
    Authorized(_, _): Authorized<EmployeeOnly>,
    JsonBody(req): JsonBody<AddProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state
        .workflow()
        .add_product(&state.request_scope(), req.pvz_id, &req.product_type)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Remove the most recently added product of the open reception.
#[tracing::instrument(skip_all)]
pub async fn delete_last(
    State(state): State<AppState>,
    Authorized(_, _): Authorized<EmployeeOnly>,
    PathParam(pvz_id): PathParam<String>,
) -> Result<Json<MessageResponse>> {
    let pvz_id = parse_pvz_id(&pvz_id)?;
    state
        .workflow()
        .remove_last_product(&state.request_scope(), pvz_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "product deleted",
    }))
}
