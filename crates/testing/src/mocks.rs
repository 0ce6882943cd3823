//! Mock implementations of the application ports.
//!
//! - [`RecordingEventPublisher`] keeps every published event
//! - [`StubSubmissionHandler`] answers wizard submissions without a store
//! - [`StalledSubmissionHandler`] never answers, for abandoned submits
//! - [`FaultyProfileStore`] wraps the in-memory store and fails one relation's
//!   inserts, to exercise rollback

use async_trait::async_trait;
use chrono::Utc;
use expert_roster_application::{
    ApplicationError, ApplicationResult, EventPublisher, ProfileStore, ProfileUnitOfWork,
    ServiceContext, ServiceEvent, SubmissionHandler,
};
use expert_roster_common::PaginationParams;
use expert_roster_domain::{
    ChildRows, ExpertSubmission, Profile, ProfileFields, ProfileId, ProfileSummary, Record,
    Relation, ReviewStatus, SubmissionError, SubmissionResult,
};
use expert_roster_infrastructure::{InMemoryProfileStore, InMemoryUnitOfWork};
use parking_lot::RwLock;
use std::sync::Arc;

/// Event publisher that records what it was given
pub struct RecordingEventPublisher {
    events: Arc<RwLock<Vec<ServiceEvent>>>,
    fail: bool,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            fail: false,
        }
    }

    /// Publisher that records events but reports every publish as failed
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn events(&self) -> Vec<ServiceEvent> {
        self.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl Default for RecordingEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: ServiceEvent) -> Result<(), ApplicationError> {
        self.events.write().push(event);
        if self.fail {
            return Err(ApplicationError::ServiceUnavailable(
                "event bus offline".to_string(),
            ));
        }
        Ok(())
    }
}

/// Submission handler returning a canned outcome and remembering its input
pub struct StubSubmissionHandler {
    submissions: RwLock<Vec<ExpertSubmission>>,
    failure: Option<SubmissionError>,
}

impl StubSubmissionHandler {
    /// Accept every submission and echo it back as a new profile
    pub fn accepting() -> Self {
        Self {
            submissions: RwLock::new(Vec::new()),
            failure: None,
        }
    }

    /// Reject every submission with `error`
    pub fn rejecting(error: SubmissionError) -> Self {
        Self {
            submissions: RwLock::new(Vec::new()),
            failure: Some(error),
        }
    }

    pub fn calls(&self) -> usize {
        self.submissions.read().len()
    }

    pub fn last_submission(&self) -> Option<ExpertSubmission> {
        self.submissions.read().last().cloned()
    }
}

#[async_trait]
impl SubmissionHandler for StubSubmissionHandler {
    async fn submit(
        &self,
        _ctx: &ServiceContext,
        submission: ExpertSubmission,
    ) -> SubmissionResult<Profile> {
        self.submissions.write().push(submission.clone());

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let id = ProfileId::new();
        let mut profile = Profile::new(id, ProfileFields::from_submission(&submission), Utc::now());
        profile.references = submission
            .references
            .into_iter()
            .map(|r| Record::new(id, r))
            .collect();
        Ok(profile)
    }

    async fn replace_children(
        &self,
        _ctx: &ServiceContext,
        id: ProfileId,
        _rows: ChildRows,
    ) -> SubmissionResult<Profile> {
        Err(self.failure.clone().unwrap_or(SubmissionError::NotFound(id)))
    }
}

/// Submission handler whose calls never complete
pub struct StalledSubmissionHandler;

#[async_trait]
impl SubmissionHandler for StalledSubmissionHandler {
    async fn submit(
        &self,
        _ctx: &ServiceContext,
        _submission: ExpertSubmission,
    ) -> SubmissionResult<Profile> {
        std::future::pending().await
    }

    async fn replace_children(
        &self,
        _ctx: &ServiceContext,
        _id: ProfileId,
        _rows: ChildRows,
    ) -> SubmissionResult<Profile> {
        std::future::pending().await
    }
}

/// In-memory store whose units of work fail when writing one relation
#[derive(Clone)]
pub struct FaultyProfileStore {
    inner: InMemoryProfileStore,
    fail_on: Relation,
}

impl FaultyProfileStore {
    pub fn failing_on(inner: InMemoryProfileStore, fail_on: Relation) -> Self {
        Self { inner, fail_on }
    }
}

#[async_trait]
impl ProfileStore for FaultyProfileStore {
    type UnitOfWork = FaultyUnitOfWork;

    async fn begin(&self) -> ApplicationResult<FaultyUnitOfWork> {
        Ok(FaultyUnitOfWork {
            inner: self.inner.begin().await?,
            fail_on: self.fail_on,
        })
    }

    async fn find_unique_by_email(&self, email: &str) -> ApplicationResult<Option<ProfileSummary>> {
        self.inner.find_unique_by_email(email).await
    }

    async fn find_by_id(
        &self,
        id: ProfileId,
        include_relations: bool,
    ) -> ApplicationResult<Option<Profile>> {
        self.inner.find_by_id(id, include_relations).await
    }

    async fn list_paged(
        &self,
        search: Option<&str>,
        pagination: &PaginationParams,
    ) -> ApplicationResult<(Vec<ProfileSummary>, u64)> {
        self.inner.list_paged(search, pagination).await
    }

    async fn delete(&self, id: ProfileId) -> ApplicationResult<bool> {
        self.inner.delete(id).await
    }

    async fn health_check(&self) -> ApplicationResult<()> {
        self.inner.health_check().await
    }
}

pub struct FaultyUnitOfWork {
    inner: InMemoryUnitOfWork,
    fail_on: Relation,
}

#[async_trait]
impl ProfileUnitOfWork for FaultyUnitOfWork {
    async fn create_profile(&mut self, fields: &ProfileFields) -> ApplicationResult<ProfileId> {
        self.inner.create_profile(fields).await
    }

    async fn create_many(&mut self, profile_id: ProfileId, rows: &ChildRows) -> ApplicationResult<()> {
        if rows.relation() == self.fail_on {
            return Err(ApplicationError::ServiceUnavailable(format!(
                "insert into {} failed",
                rows.relation().table()
            )));
        }
        self.inner.create_many(profile_id, rows).await
    }

    async fn delete_many(&mut self, profile_id: ProfileId, relation: Relation) -> ApplicationResult<u64> {
        self.inner.delete_many(profile_id, relation).await
    }

    async fn update_scalar_fields(
        &mut self,
        id: ProfileId,
        fields: &ProfileFields,
    ) -> ApplicationResult<bool> {
        self.inner.update_scalar_fields(id, fields).await
    }

    async fn update_review_status(
        &mut self,
        id: ProfileId,
        status: ReviewStatus,
        is_verified: bool,
    ) -> ApplicationResult<bool> {
        self.inner.update_review_status(id, status, is_verified).await
    }

    async fn commit(self) -> ApplicationResult<()> {
        self.inner.commit().await
    }

    async fn rollback(self) -> ApplicationResult<()> {
        self.inner.rollback().await
    }
}
