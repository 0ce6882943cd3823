//! Application state and dependency injection.
//!
//! Route handlers see the profile service through the object-safe
//! [`ProfileServiceTrait`], so the same router serves the PostgreSQL and the
//! in-memory store.

use anyhow::Context;
use async_trait::async_trait;
use expert_roster_application::{
    ApplicationResult, EventPublisher, NoOpEventPublisher, ProfileService, ProfileStore,
    ServiceConfig, ServiceContext, SubmissionHandler,
};
use expert_roster_common::{AppConfig, PaginatedResult};
use expert_roster_domain::{
    ChildRows, ExpertSubmission, Profile, ProfileId, ProfileSummary, ReviewStatus, ScalarUpdate,
    SubmissionResult,
};
use expert_roster_infrastructure::{DatabaseConfig, DatabasePool, InMemoryProfileStore, PgProfileStore};
use std::sync::Arc;
use tracing::info;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Profile service (type-erased)
    pub profiles: Arc<dyn ProfileServiceTrait>,
}

impl AppState {
    /// Wrap an existing service implementation
    pub fn new<S>(service: S) -> Self
    where
        S: ProfileServiceTrait + 'static,
    {
        Self {
            profiles: Arc::new(service),
        }
    }

    /// State backed by a fresh in-memory store, for development and tests
    pub fn in_memory() -> Self {
        Self::with_store(InMemoryProfileStore::new(), ServiceConfig::default())
    }

    /// State backed by the given store and no event consumers
    pub fn with_store<S>(store: S, config: ServiceConfig) -> Self
    where
        S: ProfileStore + 'static,
    {
        Self::new(ProfileService::new(
            Arc::new(store),
            Arc::new(NoOpEventPublisher),
            config,
        ))
    }

    /// Build state from layered settings: PostgreSQL when a database URL is
    /// configured, otherwise the in-memory store
    pub async fn from_settings(settings: &AppConfig) -> anyhow::Result<Self> {
        let service_config = ServiceConfig::from(&settings.listing);

        if settings.database.url.is_none() {
            info!("No database URL configured, using the in-memory profile store");
            return Ok(Self::with_store(InMemoryProfileStore::new(), service_config));
        }

        let db_config = DatabaseConfig::from_settings(&settings.database)?;
        let db = DatabasePool::new(&db_config)
            .await
            .context("Failed to connect to PostgreSQL")?;
        if settings.database.run_migrations {
            db.migrate().await.context("Failed to run migrations")?;
        }

        info!("Using the PostgreSQL profile store");
        Ok(Self::with_store(
            PgProfileStore::new(db.pool().clone()),
            service_config,
        ))
    }
}

// ============================================================================
// SERVICE TRAIT (Type-erased interface for route handlers)
// ============================================================================

/// Type-erased profile service trait
#[async_trait]
pub trait ProfileServiceTrait: Send + Sync {
    /// Register a new expert
    async fn submit(
        &self,
        ctx: &ServiceContext,
        submission: ExpertSubmission,
    ) -> SubmissionResult<Profile>;

    /// Load one profile with its child collections
    async fn get(&self, ctx: &ServiceContext, id: ProfileId) -> SubmissionResult<Profile>;

    /// Search and page through profiles
    async fn list(
        &self,
        ctx: &ServiceContext,
        search: Option<&str>,
        page: u32,
        per_page: Option<u32>,
    ) -> SubmissionResult<PaginatedResult<ProfileSummary>>;

    /// Full edit
    async fn update(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        submission: ExpertSubmission,
    ) -> SubmissionResult<Profile>;

    /// Quick edit of name, email and bio
    async fn update_scalar_fields(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        update: ScalarUpdate,
    ) -> SubmissionResult<Profile>;

    /// Replace one child collection
    async fn replace_children(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        rows: ChildRows,
    ) -> SubmissionResult<Profile>;

    /// Set the review status
    async fn review(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        status: ReviewStatus,
    ) -> SubmissionResult<Profile>;

    /// Delete a profile
    async fn delete(&self, ctx: &ServiceContext, id: ProfileId) -> SubmissionResult<()>;

    /// Check the backing store
    async fn health_check(&self) -> ApplicationResult<()>;
}

#[async_trait]
impl<S, E> ProfileServiceTrait for ProfileService<S, E>
where
    S: ProfileStore + 'static,
    E: EventPublisher + 'static,
{
    async fn submit(
        &self,
        ctx: &ServiceContext,
        submission: ExpertSubmission,
    ) -> SubmissionResult<Profile> {
        SubmissionHandler::submit(self, ctx, submission).await
    }

    async fn get(&self, ctx: &ServiceContext, id: ProfileId) -> SubmissionResult<Profile> {
        ProfileService::get(self, ctx, id).await
    }

    async fn list(
        &self,
        ctx: &ServiceContext,
        search: Option<&str>,
        page: u32,
        per_page: Option<u32>,
    ) -> SubmissionResult<PaginatedResult<ProfileSummary>> {
        ProfileService::list(self, ctx, search, page, per_page).await
    }

    async fn update(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        submission: ExpertSubmission,
    ) -> SubmissionResult<Profile> {
        ProfileService::update(self, ctx, id, submission).await
    }

    async fn update_scalar_fields(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        update: ScalarUpdate,
    ) -> SubmissionResult<Profile> {
        ProfileService::update_scalar_fields(self, ctx, id, update).await
    }

    async fn replace_children(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        rows: ChildRows,
    ) -> SubmissionResult<Profile> {
        SubmissionHandler::replace_children(self, ctx, id, rows).await
    }

    async fn review(
        &self,
        ctx: &ServiceContext,
        id: ProfileId,
        status: ReviewStatus,
    ) -> SubmissionResult<Profile> {
        ProfileService::review(self, ctx, id, status).await
    }

    async fn delete(&self, ctx: &ServiceContext, id: ProfileId) -> SubmissionResult<()> {
        ProfileService::delete(self, ctx, id).await
    }

    async fn health_check(&self) -> ApplicationResult<()> {
        ProfileService::health_check(self).await
    }
}
