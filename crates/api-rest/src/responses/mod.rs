//! Success response bodies.
//!
//! Single resources are wrapped as `{data, message?}`; expert listings as
//! `{items, pagination}`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use expert_roster_common::pagination::PaginatedResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope for a single resource
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// The resource
    pub data: T,

    /// Short human-readable note, e.g. the title of a validated wizard step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap `data` without a message
    pub fn success(data: T) -> Self {
        Self { data, message: None }
    }

    /// Wrap `data` with a note
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

/// One page of a listing
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Rows of the requested page
    pub items: Vec<T>,
    /// Paging totals
    pub pagination: PaginationMeta,
}

/// Paging totals for a listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: u32,
    /// Rows per page
    pub per_page: u32,
    /// Matching experts across all pages
    pub total: u64,
    /// Pages needed for `total` rows
    pub total_pages: u32,
    /// A later page exists
    pub has_next: bool,
    /// An earlier page exists
    pub has_prev: bool,
}

impl<T> From<PaginatedResult<T>> for PaginatedResponse<T> {
    fn from(result: PaginatedResult<T>) -> Self {
        let PaginatedResult {
            items,
            page,
            per_page,
            total,
            total_pages,
            has_next,
            has_prev,
        } = result;

        Self {
            items,
            pagination: PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
                has_next,
                has_prev,
            },
        }
    }
}

/// `201 Created` with a `Location` header pointing at the new resource
pub struct Created<T> {
    location: String,
    body: T,
}

impl<T> Created<T> {
    /// Respond with `body`, locating the new resource at `location`
    pub fn at(location: impl Into<String>, body: T) -> Self {
        Self {
            location: location.into(),
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (
            StatusCode::CREATED,
            [(header::LOCATION, self.location)],
            Json(ApiResponse::success(self.body)),
        )
            .into_response()
    }
}

/// `204 No Content`
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}
