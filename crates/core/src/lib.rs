//! PVZ Core - Shared domain vocabulary.
//!
//! This crate provides the types shared by every PVZ component:
//! - `server` - HTTP service running the reception workflow
//! - `cli` - Command-line tools for migrations and operator tasks
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encodings are opt-in via the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, and the fixed enumerations
//!   (cities, product types, reception statuses, roles)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
