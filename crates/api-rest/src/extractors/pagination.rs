//! List query extractor.

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use expert_roster_common::pagination::{PaginationParams, DEFAULT_PAGE};
use serde::Deserialize;

/// Search and paging for `GET /experts`.
///
/// `per_page` stays unset when the client omits it so the service can apply
/// the configured listing default.
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive contains-search over name and email
    #[serde(default)]
    pub search: Option<String>,

    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page
    #[serde(default)]
    pub per_page: Option<u32>,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

#[async_trait]
impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<ListQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid list parameters: {}", e)))?;

        let raw = PaginationParams {
            page: query.page,
            per_page: query.per_page.unwrap_or(1),
        };
        raw.validate()
            .map_err(|e| ApiError::BadRequest(format!("Invalid pagination: {}", e)))?;

        Ok(query)
    }
}
