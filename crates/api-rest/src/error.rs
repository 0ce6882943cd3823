//! HTTP error handling and conversion.
//!
//! Every failure is rendered as `{error, message, details, request_id}`.
//! Submission validation failures carry the field-error map in `details`.

use crate::middleware::request_id::current_request_id;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use expert_roster_application::ApplicationError;
use expert_roster_domain::SubmissionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// API-specific error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Registration or edit failure
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Application layer error
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Request payload failed declarative validation
    #[error("Validation failed")]
    InvalidPayload(validator::ValidationErrors),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Submission(err) => StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Application(err) => StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::InvalidPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get error code for API response
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Submission(err) => err.error_code(),
            Self::Application(err) => err.error_code(),
            Self::InvalidPayload(_) => "VALIDATION_FAILED",
            Self::BadRequest(_) => "BAD_REQUEST",
        }
    }

    /// Message shown to the caller
    pub fn message(&self) -> String {
        match self {
            Self::Submission(err) => err.user_message(),
            other => other.to_string(),
        }
    }

    /// Structured detail attached to the response body
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Submission(err) => err
                .field_errors()
                .and_then(|errors| serde_json::to_value(errors).ok()),
            Self::InvalidPayload(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        }
    }
}

/// Standardized error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub error: String,

    /// Human-readable message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Request ID for tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            request_id: None,
        }
    }

    /// Add details to the error response
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Add request ID to the error response
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if status.is_server_error() {
            error!(error_code, error = %self, "Request failed");
        } else {
            warn!(error_code, error = %self, "Request rejected");
        }

        let mut body = ErrorResponse::new(error_code, self.message());
        if let Some(details) = self.details() {
            body = body.with_details(details);
        }
        if let Some(request_id) = current_request_id() {
            body = body.with_request_id(request_id);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use expert_roster_domain::{FieldErrors, FieldPath, ProfileId, ReferenceField};

    #[test]
    fn test_submission_error_status_codes() {
        let duplicate = ApiError::from(SubmissionError::DuplicateEmail("a@b.com".to_string()));
        assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);
        assert_eq!(duplicate.message(), "An account with this email already exists");

        let missing = ApiError::from(SubmissionError::NotFound(ProfileId::new()));
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let storage = ApiError::from(SubmissionError::persistence());
        assert_eq!(storage.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(storage.message(), SubmissionError::PERSISTENCE_MESSAGE);
    }

    #[test]
    fn test_validation_details_are_keyed_by_path() {
        let mut errors = FieldErrors::new();
        errors.add(
            FieldPath::reference(1, ReferenceField::Phone),
            "Phone number must be at least 10 characters",
        );
        let err = ApiError::from(SubmissionError::Validation(errors));

        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let details = err.details().unwrap();
        assert_eq!(
            details["references.1.phone"][0],
            "Phone number must be at least 10 characters"
        );
    }

    #[test]
    fn test_store_errors_keep_their_status() {
        let err = ApiError::from(ApplicationError::ServiceUnavailable("pool closed".to_string()));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "SERVICE_UNAVAILABLE");
        assert!(err.details().is_none());
    }

    #[test]
    fn test_bad_request_has_no_details() {
        let err = ApiError::BadRequest("Invalid JSON: expected value".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Bad request: Invalid JSON: expected value");
        assert!(err.details().is_none());
    }
}
