//! Pickup point routes.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::extract::{JsonBody, QueryParams};
use crate::error::{AppError, Result};
use crate::middleware::{AnyRole, Authorized, ModeratorOnly};
use crate::models::{DateRange, PickupPoint, PickupPointSummary};
use crate::services::workflow::DEFAULT_PAGE_SIZE;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePickupPointRequest {
    pub city: String,
}

/// Query string of `GET /pvz`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    fn date_range(&self) -> Result<DateRange> {
        Ok(DateRange {
            start: parse_date(self.start_date.as_deref(), "invalid start date format")?,
            end: parse_date(self.end_date.as_deref(), "invalid end date format")?,
        })
    }
}

fn parse_date(raw: Option<&str>, message: &'static str) -> Result<Option<DateTime<Utc>>> {
    raw.map(|value| {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| AppError::invalid_input(message))
    })
    .transpose()
}

/// Register a pickup point. Moderators only.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Authorized(_, _): Authorized<ModeratorOnly>,
    JsonBody(req): JsonBody<CreatePickupPointRequest>,
) -> Result<(StatusCode, Json<PickupPoint>)> {
    let point = state
        .workflow()
        .create_pickup_point(&state.request_scope(), &req.city)
        .await?;
    Ok((StatusCode::CREATED, Json(point)))
}

/// List pickup points with their receptions in the requested window.
#[tracing::instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    Authorized(_, _): Authorized<AnyRole>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<Vec<PickupPointSummary>>> {
    let range = query.date_range()?;
    let summaries = state
        .workflow()
        .list_pickup_points(
            &state.request_scope(),
            range,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;
    Ok(Json(summaries))
}
