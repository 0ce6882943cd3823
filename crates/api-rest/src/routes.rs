//! HTTP route handlers.
//!
//! Endpoints are organized by version.

pub mod health;
pub mod v1;

pub use health::routes as health_routes;
pub use v1::routes as v1_routes;
