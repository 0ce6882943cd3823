//! Custom Axum extractors.
//!
//! List queries and JSON bodies, all rejecting with [`crate::error::ApiError`].

pub mod json;
pub mod pagination;

pub use json::{JsonBody, ValidatedJson};
pub use pagination::ListQuery;
