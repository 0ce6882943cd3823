//! Registration wizard state machine.

use super::steps::{
    new_draft, CertificationsStep, EducationStep, ExpertiseStep, PersonalInfoStep,
    PublicationsStep, ReferencesStep, Step,
};
use crate::services::{ServiceContext, SubmissionHandler};
use crate::validation::{validate_full, validate_paths, MIN_REFERENCES};
use expert_roster_domain::{ExpertSubmission, FieldErrors, Profile};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const FIX_ERRORS_MESSAGE: &str = "Please fix all validation errors before submitting";
pub const REFERENCES_MESSAGE: &str = "Please provide at least 2 references";
pub const NOT_FINAL_STEP_MESSAGE: &str = "Complete every step before submitting";

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The profile was persisted
    Submitted(Box<Profile>),
    /// Nothing was persisted; see the wizard's errors and general error
    Rejected,
}

/// Shared view of whether a wizard's submission is in flight.
///
/// [`RegistrationWizard::submit`] holds the wizard mutably until the handler
/// answers, so a UI that disables its submit control while waiting keeps a
/// clone of this instead.
#[derive(Debug, Clone, Default)]
pub struct SubmitStatus(Arc<AtomicBool>);

impl SubmitStatus {
    pub fn is_submitting(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark a submission in flight until the returned guard is dropped
    fn begin(&self) -> InFlight {
        self.0.store(true, Ordering::Release);
        InFlight(Arc::clone(&self.0))
    }
}

/// Clears the in-flight flag however the submit call ends, including when its
/// future is dropped before the handler answers.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Multi-step registration form.
///
/// Starts on step 1. `next` validates the current step before advancing,
/// `back` never validates, and `submit` re-validates the whole draft from the
/// final step before handing it to a [`SubmissionHandler`].
#[derive(Debug)]
pub struct RegistrationWizard {
    current: Step,
    draft: ExpertSubmission,
    errors: FieldErrors,
    general_error: Option<String>,
    status: SubmitStatus,
}

impl Default for RegistrationWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self::with_draft(new_draft())
    }

    /// Start from an existing draft, e.g. one restored from a client
    pub fn with_draft(draft: ExpertSubmission) -> Self {
        Self {
            current: Step::FIRST,
            draft,
            errors: FieldErrors::new(),
            general_error: None,
            status: SubmitStatus::default(),
        }
    }

    pub fn get_current_step(&self) -> Step {
        self.current
    }

    pub fn get_errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn general_error(&self) -> Option<&str> {
        self.general_error.as_deref()
    }

    /// True while a submission is being handed to the handler
    pub fn is_submitting(&self) -> bool {
        self.status.is_submitting()
    }

    /// Handle that keeps reporting [`Self::is_submitting`] while `submit` runs
    pub fn submit_status(&self) -> SubmitStatus {
        self.status.clone()
    }

    pub fn draft(&self) -> &ExpertSubmission {
        &self.draft
    }

    pub fn into_draft(self) -> ExpertSubmission {
        self.draft
    }

    pub fn personal_info(&mut self) -> PersonalInfoStep<'_> {
        PersonalInfoStep::new(&mut self.draft.personal_info)
    }

    pub fn expertise(&mut self) -> ExpertiseStep<'_> {
        ExpertiseStep::new(&mut self.draft.expertise)
    }

    pub fn education(&mut self) -> EducationStep<'_> {
        EducationStep::new(&mut self.draft.education)
    }

    pub fn certifications(&mut self) -> CertificationsStep<'_> {
        CertificationsStep::new(&mut self.draft.certifications)
    }

    pub fn publications(&mut self) -> PublicationsStep<'_> {
        PublicationsStep::new(&mut self.draft.publications)
    }

    pub fn references(&mut self) -> ReferencesStep<'_> {
        ReferencesStep::new(&mut self.draft.references)
    }

    /// Validate the current step and advance when it passes.
    ///
    /// Returns whether the step passed. On failure the wizard stays put and
    /// the field errors describe what to fix.
    pub fn next(&mut self) -> bool {
        self.general_error = None;

        if let Err(errors) = validate_paths(&self.draft, self.current.field_paths()) {
            debug!(step = self.current.number(), errors = errors.len(), "Step validation failed");
            self.errors = errors;
            return false;
        }

        if self.current.is_last() && self.draft.references.len() < MIN_REFERENCES {
            self.general_error = Some(REFERENCES_MESSAGE.to_string());
            return false;
        }

        self.errors = FieldErrors::new();
        self.current = self.current.next();
        true
    }

    /// Go back one step without validating
    pub fn back(&mut self) {
        self.current = self.current.previous();
    }

    /// Validate the full draft and hand it to `handler`.
    ///
    /// Only available on the final step. Dropping the returned future before
    /// it completes abandons the attempt and allows a fresh one; whatever the
    /// handler already persisted stays persisted.
    #[instrument(skip(self, handler, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn submit<H>(&mut self, handler: &H, ctx: &ServiceContext) -> SubmitOutcome
    where
        H: SubmissionHandler + ?Sized,
    {
        if !self.current.is_last() {
            self.general_error = Some(NOT_FINAL_STEP_MESSAGE.to_string());
            return SubmitOutcome::Rejected;
        }

        self.general_error = None;

        let submission = match validate_full(self.draft.clone()) {
            Ok(submission) => submission,
            Err(errors) => {
                self.errors = errors;
                self.general_error = Some(FIX_ERRORS_MESSAGE.to_string());
                return SubmitOutcome::Rejected;
            }
        };

        if submission.references.len() < MIN_REFERENCES {
            self.general_error = Some(REFERENCES_MESSAGE.to_string());
            return SubmitOutcome::Rejected;
        }

        let in_flight = self.status.begin();
        let result = handler.submit(ctx, submission).await;
        drop(in_flight);

        match result {
            Ok(profile) => {
                info!(profile_id = %profile.id, "Registration submitted");
                self.errors = FieldErrors::new();
                SubmitOutcome::Submitted(Box::new(profile))
            }
            Err(err) => {
                warn!(error_code = err.error_code(), "Registration rejected");
                if let Some(errors) = err.field_errors() {
                    self.errors = errors.clone();
                }
                self.general_error = Some(err.user_message());
                SubmitOutcome::Rejected
            }
        }
    }
}
