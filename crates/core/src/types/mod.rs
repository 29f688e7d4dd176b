//! Core types for the pickup point domain.
//!
//! This module provides type-safe wrappers for common domain concepts.

#[macro_use]
mod wire;

pub mod catalog;
pub mod email;
pub mod id;
pub mod role;
pub mod status;

pub use catalog::{City, ProductType};
pub use email::{Email, EmailError};
pub use id::*;
pub use role::Role;
pub use status::ReceptionStatus;
pub use wire::ParseEnumError;
