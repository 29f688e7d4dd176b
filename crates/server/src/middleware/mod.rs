//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID
//! 4. Metrics (matched routes only)
//! 5. Authentication (protected routes only)

pub mod auth;
pub mod metrics;
pub mod request_id;

pub use auth::{AnyRole, Authorized, EmployeeOnly, ModeratorOnly, RolePolicy, authenticate};
pub use metrics::track_metrics;
pub use request_id::request_id_middleware;
