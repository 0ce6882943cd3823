//! API v1 routes.

use crate::state::AppState;
use axum::Router;

pub mod experts;

/// Create all v1 API routes
pub fn routes() -> Router<AppState> {
    Router::new().merge(experts::routes())
}
