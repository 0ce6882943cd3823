//! Profile Service
//!
//! Registration, edit and admin operations over expert profiles. Writes go
//! through a [`ProfileUnitOfWork`] so a profile and its child collections are
//! either stored together or not at all.

use super::{EventPublisher, ServiceConfig, ServiceContext, ServiceEvent};
use crate::validation::{validate_full, validate_relation, Validatable};
use crate::{ApplicationError, ApplicationResult};
use async_trait::async_trait;
use expert_roster_common::{PaginatedResult, PaginationParams};
use expert_roster_domain::{
    ChildRows, ExpertSubmission, Profile, ProfileFields, ProfileId, ProfileSummary, Relation,
    ReviewStatus, ScalarUpdate, SubmissionError, SubmissionResult,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Profile store port
///
/// Email addresses are unique across profiles, compared case-insensitively.
/// A write that would break this fails with [`ApplicationError::Conflict`].
#[async_trait]
pub trait ProfileStore: Send + Sync {
    type UnitOfWork: ProfileUnitOfWork;

    /// Open an atomic unit of work
    async fn begin(&self) -> ApplicationResult<Self::UnitOfWork>;

    async fn find_unique_by_email(&self, email: &str) -> ApplicationResult<Option<ProfileSummary>>;

    /// Load a profile, with its child collections when `include_relations` is set
    async fn find_by_id(
        &self,
        id: ProfileId,
        include_relations: bool,
    ) -> ApplicationResult<Option<Profile>>;

    /// Newest-first page of profiles whose name or email contains `search`,
    /// plus the total number of matches
    async fn list_paged(
        &self,
        search: Option<&str>,
        pagination: &PaginationParams,
    ) -> ApplicationResult<(Vec<ProfileSummary>, u64)>;

    /// Delete a profile and its children; false if it did not exist
    async fn delete(&self, id: ProfileId) -> ApplicationResult<bool>;

    async fn health_check(&self) -> ApplicationResult<()>;
}

/// Writes staged inside one transaction.
///
/// Dropping a unit of work without committing discards its writes.
#[async_trait]
pub trait ProfileUnitOfWork: Send {
    async fn create_profile(&mut self, fields: &ProfileFields) -> ApplicationResult<ProfileId>;

    /// Insert rows for one relation, each owned by `profile_id`
    async fn create_many(&mut self, profile_id: ProfileId, rows: &ChildRows) -> ApplicationResult<()>;

    /// Delete every row of `relation` owned by `profile_id`
    async fn delete_many(&mut self, profile_id: ProfileId, relation: Relation) -> ApplicationResult<u64>;

    /// Overwrite the parent record's columns; false if it does not exist
    async fn update_scalar_fields(
        &mut self,
        id: ProfileId,
        fields: &ProfileFields,
    ) -> ApplicationResult<bool>;

    async fn update_review_status(
        &mut self,
        id: ProfileId,
        status: ReviewStatus,
        is_verified: bool,
    ) -> ApplicationResult<bool>;

    async fn commit(self) -> ApplicationResult<()>;

    async fn rollback(self) -> ApplicationResult<()>;
}

/// Registration and edit entry points shared by the wizard and the edit flow
#[async_trait]
pub trait SubmissionHandler: Send + Sync {
    /// Validate and persist a new profile with all of its child collections
    async fn submit(
        &self,
        ctx: &ServiceContext,
        submission: ExpertSubmission,
    ) -> SubmissionResult<Profile>;

    /// Replace every row of one relation of an existing profile
    async fn replace_children(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        rows: ChildRows,
    ) -> SubmissionResult<Profile>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ListKey {
    search: Option<String>,
    page: u32,
    per_page: u32,
}

#[derive(Debug, Clone)]
struct CachedPage {
    page: PaginatedResult<ProfileSummary>,
    stored_at: Instant,
}

/// Profile service implementation
pub struct ProfileService<S, E>
where
    S: ProfileStore,
    E: EventPublisher,
{
    store: Arc<S>,
    event_publisher: Arc<E>,
    config: ServiceConfig,
    list_cache: RwLock<HashMap<ListKey, CachedPage>>,
}

impl<S, E> ProfileService<S, E>
where
    S: ProfileStore,
    E: EventPublisher,
{
    pub fn new(store: Arc<S>, event_publisher: Arc<E>, config: ServiceConfig) -> Self {
        Self {
            store,
            event_publisher,
            config,
            list_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Get a profile with all child collections
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn get(&self, ctx: &ServiceContext, id: ProfileId) -> SubmissionResult<Profile> {
        self.load(id).await
    }

    /// Search and page through profiles, newest first.
    ///
    /// Without `per_page` the configured default page size applies.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn list(
        &self,
        ctx: &ServiceContext,
        search: Option<&str>,
        page: u32,
        per_page: Option<u32>,
    ) -> SubmissionResult<PaginatedResult<ProfileSummary>> {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let pagination = self.config.pagination(page, per_page);
        let key = ListKey {
            search: search.as_ref().map(|s| s.to_lowercase()),
            page: pagination.page,
            per_page: pagination.per_page,
        };

        if let Some(page) = self.cached_page(&key) {
            debug!("List cache hit");
            return Ok(page);
        }

        let (items, total) = self
            .store
            .list_paged(search.as_deref(), &pagination)
            .await
            .map_err(|e| store_failure("list_paged", None, None, e))?;

        let page = PaginatedResult::from_params(items, &pagination, total);
        if self.config.cache_enabled {
            self.list_cache.write().insert(
                key,
                CachedPage {
                    page: page.clone(),
                    stored_at: Instant::now(),
                },
            );
        }

        Ok(page)
    }

    /// Full edit: overwrite the scalar fields and replace all seven relations
    #[instrument(skip(self, ctx, submission), fields(correlation_id = %ctx.correlation_id))]
    pub async fn update(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        submission: ExpertSubmission,
    ) -> SubmissionResult<Profile> {
        let submission = validate_full(submission).map_err(SubmissionError::Validation)?;
        self.ensure_exists(id).await?;

        let email = submission.personal_info.email.clone();
        self.ensure_email_free(&email, Some(id)).await?;

        let fields = ProfileFields::from_submission(&submission);
        let mut uow = self
            .store
            .begin()
            .await
            .map_err(|e| store_failure("begin", Some(id), Some(&email), e))?;
        let outcome = overwrite_profile(&mut uow, id, &fields, &submission).await;
        finish(uow, outcome)
            .await
            .map_err(|e| store_failure("update", Some(id), Some(&email), e))?;

        info!(profile_id = %id, "Expert profile updated");
        self.after_write(ServiceEvent::ProfileUpdated { profile_id: id })
            .await;

        self.load(id).await
    }

    /// Quick edit of name, email and bio
    #[instrument(skip(self, ctx, update), fields(correlation_id = %ctx.correlation_id))]
    pub async fn update_scalar_fields(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        update: ScalarUpdate,
    ) -> SubmissionResult<Profile> {
        update
            .validate_all()
            .into_result()
            .map_err(SubmissionError::Validation)?;

        let current = self.ensure_exists(id).await?;
        self.ensure_email_free(&update.email, Some(id)).await?;

        let fields = ProfileFields {
            full_name: update.full_name,
            email: update.email,
            bio: update.bio.unwrap_or(current.fields.bio),
            ..current.fields
        };

        let mut uow = self
            .store
            .begin()
            .await
            .map_err(|e| store_failure("begin", Some(id), Some(&fields.email), e))?;
        let outcome = match uow.update_scalar_fields(id, &fields).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(ApplicationError::NotFound(id.to_string())),
            Err(e) => Err(e),
        };
        finish(uow, outcome)
            .await
            .map_err(|e| store_failure("update_scalar_fields", Some(id), Some(&fields.email), e))?;

        info!(profile_id = %id, "Expert details updated");
        self.after_write(ServiceEvent::ProfileUpdated { profile_id: id })
            .await;

        self.load(id).await
    }

    /// Set the review status; approval also marks the profile verified
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn review(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        status: ReviewStatus,
    ) -> SubmissionResult<Profile> {
        let is_verified = status == ReviewStatus::Approved;

        let mut uow = self
            .store
            .begin()
            .await
            .map_err(|e| store_failure("begin", Some(id), None, e))?;
        let outcome = match uow.update_review_status(id, status, is_verified).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(ApplicationError::NotFound(id.to_string())),
            Err(e) => Err(e),
        };
        finish(uow, outcome)
            .await
            .map_err(|e| store_failure("update_review_status", Some(id), None, e))?;

        info!(profile_id = %id, status = %status, "Expert reviewed");
        self.after_write(ServiceEvent::ProfileReviewed {
            profile_id: id,
            status,
        })
        .await;

        self.load(id).await
    }

    /// Delete a profile and all of its child collections
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn delete(&self, ctx: &ServiceContext, id: ProfileId) -> SubmissionResult<()> {
        let deleted = self
            .store
            .delete(id)
            .await
            .map_err(|e| store_failure("delete", Some(id), None, e))?;

        if !deleted {
            return Err(SubmissionError::NotFound(id));
        }

        info!(profile_id = %id, "Expert profile deleted");
        self.after_write(ServiceEvent::ProfileDeleted { profile_id: id })
            .await;

        Ok(())
    }

    /// Check that the backing store is reachable
    pub async fn health_check(&self) -> ApplicationResult<()> {
        self.store.health_check().await
    }

    async fn load(&self, id: ProfileId) -> SubmissionResult<Profile> {
        self.store
            .find_by_id(id, true)
            .await
            .map_err(|e| store_failure("find_by_id", Some(id), None, e))?
            .ok_or(SubmissionError::NotFound(id))
    }

    async fn ensure_exists(&self, id: ProfileId) -> SubmissionResult<Profile> {
        self.store
            .find_by_id(id, false)
            .await
            .map_err(|e| store_failure("find_by_id", Some(id), None, e))?
            .ok_or(SubmissionError::NotFound(id))
    }

    /// Best-effort pre-check; the store's unique constraint is authoritative
    async fn ensure_email_free(&self, email: &str, owner: Option<ProfileId>) -> SubmissionResult<()> {
        let existing = self
            .store
            .find_unique_by_email(email)
            .await
            .map_err(|e| store_failure("find_unique_by_email", owner, None, e))?;

        match existing {
            Some(other) if Some(other.id) != owner => {
                warn!(existing_profile = %other.id, "Email already registered");
                Err(SubmissionError::DuplicateEmail(email.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn cached_page(&self, key: &ListKey) -> Option<PaginatedResult<ProfileSummary>> {
        if !self.config.cache_enabled {
            return None;
        }

        let ttl = Duration::from_secs(self.config.cache_ttl_seconds);
        self.list_cache
            .read()
            .get(key)
            .filter(|cached| cached.stored_at.elapsed() < ttl)
            .map(|cached| cached.page.clone())
    }

    /// Drop cached list pages and notify subscribers
    async fn after_write(&self, event: ServiceEvent) {
        self.list_cache.write().clear();

        if let Err(err) = self.event_publisher.publish(event).await {
            warn!(error = %err, "Failed to publish profile event");
        }
    }
}

#[async_trait]
impl<S, E> SubmissionHandler for ProfileService<S, E>
where
    S: ProfileStore,
    E: EventPublisher,
{
    #[instrument(skip(self, ctx, submission), fields(correlation_id = %ctx.correlation_id))]
    async fn submit(
        &self,
        ctx: &ServiceContext,
        submission: ExpertSubmission,
    ) -> SubmissionResult<Profile> {
        let submission = validate_full(submission).map_err(SubmissionError::Validation)?;

        let email = submission.personal_info.email.clone();
        self.ensure_email_free(&email, None).await?;

        let fields = ProfileFields::from_submission(&submission);
        let mut uow = self
            .store
            .begin()
            .await
            .map_err(|e| store_failure("begin", None, Some(&email), e))?;
        let outcome = create_profile(&mut uow, &fields, &submission).await;
        let id = finish(uow, outcome)
            .await
            .map_err(|e| store_failure("create_profile", None, Some(&email), e))?;

        info!(profile_id = %id, "Expert registered");
        self.after_write(ServiceEvent::ProfileCreated { profile_id: id })
            .await;

        self.load(id).await
    }

    #[instrument(skip(self, ctx, rows), fields(correlation_id = %ctx.correlation_id, relation = %rows.relation()))]
    async fn replace_children(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        rows: ChildRows,
    ) -> SubmissionResult<Profile> {
        validate_relation(&rows).map_err(SubmissionError::Validation)?;
        self.ensure_exists(id).await?;

        let relation = rows.relation();
        let rows = rows.normalized();

        let mut uow = self
            .store
            .begin()
            .await
            .map_err(|e| store_failure("begin", Some(id), None, e))?;
        let outcome = replace_relation(&mut uow, id, &rows).await;
        let removed = finish(uow, outcome)
            .await
            .map_err(|e| store_failure("replace_children", Some(id), None, e))?;

        info!(
            profile_id = %id,
            relation = %relation,
            removed,
            inserted = rows.len(),
            "Child collection replaced"
        );
        self.after_write(ServiceEvent::ChildrenReplaced {
            profile_id: id,
            relation,
        })
        .await;

        self.load(id).await
    }
}

/// Parent record first, then every child collection
async fn create_profile<U: ProfileUnitOfWork>(
    uow: &mut U,
    fields: &ProfileFields,
    submission: &ExpertSubmission,
) -> ApplicationResult<ProfileId> {
    let id = uow.create_profile(fields).await?;
    for rows in ChildRows::all_from_submission(submission) {
        uow.create_many(id, &rows.normalized()).await?;
    }
    Ok(id)
}

async fn overwrite_profile<U: ProfileUnitOfWork>(
    uow: &mut U,
    id: ProfileId,
    fields: &ProfileFields,
    submission: &ExpertSubmission,
) -> ApplicationResult<()> {
    if !uow.update_scalar_fields(id, fields).await? {
        return Err(ApplicationError::NotFound(id.to_string()));
    }
    for rows in ChildRows::all_from_submission(submission) {
        replace_relation(uow, id, &rows.normalized()).await?;
    }
    Ok(())
}

/// Delete-then-insert; returns the number of rows removed
async fn replace_relation<U: ProfileUnitOfWork>(
    uow: &mut U,
    id: ProfileId,
    rows: &ChildRows,
) -> ApplicationResult<u64> {
    let removed = uow.delete_many(id, rows.relation()).await?;
    uow.create_many(id, rows).await?;
    Ok(removed)
}

/// Commit on success, roll back on failure
async fn finish<U: ProfileUnitOfWork, T>(uow: U, outcome: ApplicationResult<T>) -> ApplicationResult<T> {
    match outcome {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Map a port error onto the closed set of user-facing failures.
///
/// A conflict on a write that carries an email is a duplicate registration;
/// a missing row on a write that targets a profile is `NotFound`. Anything
/// else is logged here and reported generically.
fn store_failure(
    operation: &'static str,
    id: Option<ProfileId>,
    email: Option<&str>,
    err: ApplicationError,
) -> SubmissionError {
    match (err, id, email) {
        (ApplicationError::Conflict(_), _, Some(email)) => {
            warn!(operation, "Email uniqueness violated");
            SubmissionError::DuplicateEmail(email.to_string())
        }
        (ApplicationError::NotFound(_), Some(id), _) => SubmissionError::NotFound(id),
        (err, _, _) => {
            error!(operation, error = %err, "Profile store operation failed");
            SubmissionError::persistence()
        }
    }
}
