//! Per-request HTTP metrics.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Record the request count and latency against the matched route template.
///
/// Installed with `route_layer` so that only requests hitting a real route
/// are counted and the endpoint label stays bounded.
pub async fn track_metrics(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_owned(), |p| p.as_str().to_owned());
    let method = request.method().clone();

    let started = Instant::now();
    let response = next.run(request).await;

    state.metrics().observe_request(
        method.as_str(),
        &endpoint,
        response.status().as_u16(),
        started.elapsed(),
    );

    response
}
