//! Application Services
//!
//! Business logic orchestration layer that coordinates validation, store
//! access and event publication.

mod profile;

pub use profile::*;

use crate::ApplicationError;
use async_trait::async_trait;
use expert_roster_common::{ListingConfig, PaginationParams};
use expert_roster_domain::{ProfileId, Relation, ReviewStatus};

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum page size for list operations
    pub max_page_size: u32,
    /// Default page size for list operations
    pub default_page_size: u32,
    /// Enable caching of list pages
    pub cache_enabled: bool,
    /// Cache TTL in seconds
    pub cache_ttl_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            default_page_size: 20,
            cache_enabled: true,
            cache_ttl_seconds: 300,
        }
    }
}

impl From<&ListingConfig> for ServiceConfig {
    fn from(config: &ListingConfig) -> Self {
        Self {
            max_page_size: config.max_page_size,
            default_page_size: config.default_page_size,
            cache_enabled: config.cache_enabled,
            ..Self::default()
        }
    }
}

impl ServiceConfig {
    /// Page selection for a list call, falling back to the default size and
    /// capping at the maximum
    pub fn pagination(&self, page: u32, per_page: Option<u32>) -> PaginationParams {
        let per_page = per_page
            .filter(|&n| n > 0)
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size);
        PaginationParams::new(page, per_page)
    }
}

/// Service context for request handling
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// Request correlation ID for tracing
    pub correlation_id: String,
}

impl ServiceContext {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
        }
    }
}

/// Service event for downstream consumers (list views, notifications)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    ProfileCreated { profile_id: ProfileId },
    ProfileUpdated { profile_id: ProfileId },
    ChildrenReplaced { profile_id: ProfileId, relation: Relation },
    ProfileReviewed { profile_id: ProfileId, status: ReviewStatus },
    ProfileDeleted { profile_id: ProfileId },
}

impl ServiceEvent {
    pub fn profile_id(&self) -> ProfileId {
        match self {
            ServiceEvent::ProfileCreated { profile_id }
            | ServiceEvent::ProfileUpdated { profile_id }
            | ServiceEvent::ChildrenReplaced { profile_id, .. }
            | ServiceEvent::ProfileReviewed { profile_id, .. }
            | ServiceEvent::ProfileDeleted { profile_id } => *profile_id,
        }
    }
}

/// Event publisher trait for service events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: ServiceEvent) -> Result<(), ApplicationError>;
}

/// No-op event publisher
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: ServiceEvent) -> Result<(), ApplicationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_config_from_listing() {
        let listing = ListingConfig {
            default_page_size: 10,
            max_page_size: 50,
            cache_enabled: false,
        };
        let config = ServiceConfig::from(&listing);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 50);
        assert!(!config.cache_enabled);
        assert_eq!(config.cache_ttl_seconds, 300);
    }

    #[test]
    fn test_pagination_uses_configured_sizes() {
        let config = ServiceConfig {
            default_page_size: 5,
            max_page_size: 50,
            ..ServiceConfig::default()
        };

        assert_eq!(config.pagination(2, None).per_page, 5);
        assert_eq!(config.pagination(2, None).page, 2);
        assert_eq!(config.pagination(1, Some(0)).per_page, 5);
        assert_eq!(config.pagination(1, Some(30)).per_page, 30);
        assert_eq!(config.pagination(1, Some(80)).per_page, 50);
        assert_eq!(config.pagination(0, None).page, 1);
    }

    #[test]
    fn test_event_profile_id() {
        let id = ProfileId::new();
        let event = ServiceEvent::ChildrenReplaced {
            profile_id: id,
            relation: Relation::Skills,
        };
        assert_eq!(event.profile_id(), id);
    }
}
