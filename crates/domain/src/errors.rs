//! Error types for the expert roster domain.
//!
//! `SubmissionError` is the small closed set of user-facing failures produced
//! by registration and edit operations. Raw storage errors never cross this
//! boundary; they are logged where they happen and reported as `Persistence`.

use crate::identifiers::ProfileId;
use crate::validation::FieldErrors;

/// Failure of a registration, edit, view or delete operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// One or more fields failed schema validation
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Another profile already uses this email address
    #[error("An account with this email already exists")]
    DuplicateEmail(String),

    /// Storage failed for a reason other than a uniqueness conflict
    #[error("{0}")]
    Persistence(String),

    /// The targeted profile does not exist
    #[error("Expert not found: {0}")]
    NotFound(ProfileId),
}

impl SubmissionError {
    /// Generic message shown for any storage failure.
    pub const PERSISTENCE_MESSAGE: &'static str =
        "Failed to save expert profile. Please try again later.";

    /// Storage failure with the generic user-facing message.
    pub fn persistence() -> Self {
        Self::Persistence(Self::PERSISTENCE_MESSAGE.to_string())
    }

    /// Machine-readable error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
        }
    }

    /// HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 422,
            Self::DuplicateEmail(_) => 409,
            Self::Persistence(_) => 503,
            Self::NotFound(_) => 404,
        }
    }

    /// Message suitable for showing to the person who submitted the form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_) => "Please fix all validation errors before submitting".to_string(),
            Self::NotFound(_) => "Expert not found".to_string(),
            other => other.to_string(),
        }
    }

    /// Field errors carried by a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Text that does not name a known enumeration value or field path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Unknown enumeration value
    #[error("Unknown {kind}: {value}")]
    Unknown { kind: &'static str, value: String },

    /// Malformed field path
    #[error("Invalid field path: {0}")]
    FieldPath(String),
}

impl ParseError {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Self::Unknown {
            kind,
            value: value.to_string(),
        }
    }
}

/// Result type for submission handler operations
pub type SubmissionResult<T> = Result<T, SubmissionError>;
