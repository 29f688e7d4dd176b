//! Request extractors whose rejections render as `{"message": ...}`.

use axum::extract::{FromRequest, FromRequestParts};
use pvz_core::PickupPointId;

use crate::error::AppError;

/// JSON request body. A malformed body is `invalid request body`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query string. An unparseable query is `invalid query parameters`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// Path parameters. A segment that does not deserialize is
/// `invalid path parameters`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

/// Parse a path segment into a pickup point id.
///
/// # Errors
///
/// Returns `invalid pvz id` if the segment is not a UUID.
pub fn parse_pvz_id(raw: &str) -> Result<PickupPointId, AppError> {
    raw.parse()
        .map_err(|_| AppError::invalid_input("invalid pvz id"))
}
