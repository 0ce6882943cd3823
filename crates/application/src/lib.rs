//! Application layer for Expert Roster
//!
//! This crate orchestrates the registration workflow and profile management
//! on top of the domain model.
//!
//! ## Modules
//!
//! - `validation` - Schema validation of submissions, per step and per relation
//! - `wizard` - Multi-step registration wizard and its step editors
//! - `services` - Submission handler, profile service and persistence ports

pub mod services;
pub mod validation;
pub mod wizard;

// Re-export commonly used types
pub use services::{
    EventPublisher, NoOpEventPublisher, ProfileService, ProfileStore, ProfileUnitOfWork,
    ServiceConfig, ServiceContext, ServiceEvent, SubmissionHandler,
};
pub use validation::{validate_full, validate_paths, validate_relation, Validatable, ValidationRules};
pub use wizard::{RegistrationWizard, Step, StepError, StepForm, SubmitOutcome, SubmitStatus};

// Common error types for the application layer
use thiserror::Error;

/// Errors raised by persistence and messaging ports
#[derive(Error, Debug, Clone)]
pub enum ApplicationError {
    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Resource conflict (e.g., duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// External service unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl ApplicationError {
    /// Get HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            ApplicationError::NotFound(_) => 404,
            ApplicationError::Conflict(_) => 409,
            ApplicationError::Internal(_) => 500,
            ApplicationError::ServiceUnavailable(_) => 503,
            ApplicationError::Timeout(_) => 504,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ApplicationError::NotFound(_) => "NOT_FOUND",
            ApplicationError::Conflict(_) => "CONFLICT",
            ApplicationError::Internal(_) => "INTERNAL_ERROR",
            ApplicationError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ApplicationError::Timeout(_) => "TIMEOUT",
        }
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;
