//! Business logic services.
//!
//! # Services
//!
//! - `workflow` - Pickup point, reception and product lifecycle
//! - `auth` - Registration, login, tokens and role checks
//!
//! Every operation takes a [`RequestScope`] carrying the caller's deadline
//! and cancellation signal, and fails with a [`ServiceError`].

pub mod auth;
pub mod error;
pub mod scope;
pub mod workflow;

pub use error::{InternalError, ServiceError};
pub use scope::RequestScope;
pub use workflow::Workflow;
