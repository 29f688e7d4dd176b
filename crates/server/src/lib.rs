//! PVZ Server library.
//!
//! Pickup point reception workflow behind an axum HTTP surface. The binary
//! in `main.rs` wires the Postgres store, Sentry and tracing around
//! [`routes::router`]; tests drive the same router over the in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
