//! Expert Roster REST API
//!
//! Axum-based HTTP surface over the expert registration and profile
//! management services, with OpenAPI documentation and structured error
//! responses.
//!
//! ## Architecture
//!
//! - **app**: Router assembly and middleware stack
//! - **routes**: HTTP route handlers (health, v1 experts)
//! - **middleware**: Request ID propagation and request logging
//! - **extractors**: Validated JSON and list query extractors
//! - **responses**: Standardized response envelopes
//! - **error**: HTTP error handling and conversion
//! - **state**: Shared service handle
//!
//! ## Usage
//!
//! ```rust,no_run
//! use expert_roster_api_rest::{build_router, ApiConfig, AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ApiConfig::from_env().expect("Failed to load config");
//!     let app = build_router(AppState::in_memory(), &config);
//!
//!     let listener = tokio::net::TcpListener::bind(config.server_address())
//!         .await
//!         .expect("Failed to bind");
//!
//!     axum::serve(listener, app).await.expect("Server error");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod responses;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use app::{build_router, create_app};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
