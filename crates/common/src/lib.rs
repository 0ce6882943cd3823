//! Shared utilities for the Expert Roster services:
//! - Configuration management
//! - Logging setup
//! - Pagination helpers

pub mod config;
pub mod pagination;
pub mod telemetry;

pub use config::{AppConfig, DatabaseConfig, ListingConfig, ServerConfig, TelemetryConfig};
pub use pagination::{PaginatedResult, PaginationParams};
pub use telemetry::init_tracing;
