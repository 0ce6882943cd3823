//! Testing utilities for Expert Roster
//!
//! This crate provides:
//! - Fixtures producing valid submissions with realistic data
//! - A fluent builder for submissions with specific defects
//! - Recording and fault-injecting implementations of the service ports
//! - A harness wiring the profile service to an in-memory store
//!
//! # Examples
//!
//! ```
//! use expert_roster_testing::{fixtures::*, builders::*};
//!
//! let submission = SubmissionBuilder::new()
//!     .with_email("ada@example.com")
//!     .without_references()
//!     .build();
//! assert!(submission.references.is_empty());
//! ```

pub mod builders;
pub mod fixtures;
pub mod mocks;

// Re-export commonly used types
pub use builders::*;
pub use fixtures::*;
pub use mocks::*;

// Re-export testing dependencies for convenience
pub use fake;
pub use proptest;

use expert_roster_application::{ProfileService, ServiceConfig, ServiceContext};
use expert_roster_infrastructure::InMemoryProfileStore;
use std::sync::Arc;

/// Profile service over the in-memory store with recorded events
pub type TestProfileService = ProfileService<InMemoryProfileStore, RecordingEventPublisher>;

/// Profile service wired to an in-memory store, with handles on both ends.
pub struct TestHarness {
    pub service: Arc<TestProfileService>,
    pub store: InMemoryProfileStore,
    pub events: Arc<RecordingEventPublisher>,
    pub ctx: ServiceContext,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        let store = InMemoryProfileStore::new();
        let events = Arc::new(RecordingEventPublisher::new());
        let service = Arc::new(ProfileService::new(
            Arc::new(store.clone()),
            Arc::clone(&events),
            config,
        ));

        Self {
            service,
            store,
            events,
            ctx: ServiceContext::new("test-correlation-id"),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
