//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Public
//! POST /dummyLogin                        - Token for a synthetic user
//! POST /register                          - Register an operator
//! POST /login                             - Login with email and password
//! GET  /health                            - Liveness
//! GET  /health/ready                      - Store readiness
//! GET  /metrics                           - Prometheus exposition
//!
//! # Authenticated
//! POST /pvz                               - Register a pickup point (moderator)
//! GET  /pvz                               - List pickup points (any role)
//! POST /pvz/{pvz_id}/close_last_reception - Close the open reception (employee)
//! POST /pvz/{pvz_id}/delete_last_product  - Remove the last product (employee)
//! POST /receptions                        - Open a reception (employee)
//! POST /products                          - Add a product (employee)
//! ```

pub mod auth;
pub mod extract;
pub mod health;
pub mod pickup_points;
pub mod products;
pub mod receptions;

use axum::{
    Router,
    http::{Request, Response},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{authenticate, request_id_middleware, track_metrics};
use crate::state::AppState;

/// Routes that need no token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/dummyLogin", post(auth::dummy_login))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/metrics", get(health::metrics))
}

/// Routes that require a bearer token. Role checks happen per handler.
pub fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/pvz",
            post(pickup_points::create).get(pickup_points::list),
        )
        .route(
            "/pvz/{pvz_id}/close_last_reception",
            post(receptions::close_last),
        )
        .route(
            "/pvz/{pvz_id}/delete_last_product",
            post(products::delete_last),
        )
        .route("/receptions", post(receptions::open))
        .route("/products", post(products::add))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
}

/// Build the full application router with its middleware stack.
///
/// Sentry layers are added by the binary so that tests can drive this
/// router directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state))
        .route_layer(from_fn_with_state(state.clone(), track_metrics))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
