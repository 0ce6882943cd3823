//! Tests for the profile service
//!
//! Registration, relation replacement, atomicity, listing and the admin
//! operations, all against the in-memory store.

use expert_roster_application::{
    ProfileService, ServiceConfig, ServiceContext, ServiceEvent, SubmissionHandler,
};
use expert_roster_domain::{
    ChildRows, ProfileId, Relation, ReviewStatus, ScalarUpdate, SkillLevel, SubmissionError,
    VerificationStatus,
};
use expert_roster_infrastructure::InMemoryProfileStore;
use expert_roster_testing::{
    builders::*, fixtures::*, mocks::*, TestHarness,
};
use fake::{faker::name::en::Name, Fake};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_submit_round_trips_with_system_values() {
    // Arrange
    let harness = TestHarness::new();
    let mut submission = valid_submission();
    submission.expertise.skills[0].endorsements = 12;

    // Act
    let profile = harness
        .service
        .submit(&harness.ctx, submission.clone())
        .await
        .unwrap();

    // Assert
    assert_eq!(profile.review_status, ReviewStatus::Pending);
    assert!(!profile.is_verified);
    assert_eq!(profile.skills[0].data.endorsements, 0);
    assert_eq!(
        profile.certifications[0].data.verification_status,
        Some(VerificationStatus::Pending)
    );
    assert!(profile.references.iter().all(|r| r.profile_id == profile.id));

    let mut expected = submission;
    expected.expertise.skills[0].endorsements = 0;
    expected.certifications[0].verification_status = Some(VerificationStatus::Pending);
    assert_eq!(profile.to_submission(), expected);

    assert_eq!(
        harness.events.events(),
        vec![ServiceEvent::ProfileCreated { profile_id: profile.id }]
    );
}

#[tokio::test]
async fn test_submit_rejects_invalid_submission_without_writing() {
    let harness = TestHarness::new();
    let submission = SubmissionBuilder::new().with_reference_count(1).build();

    let err = harness
        .service
        .submit(&harness.ctx, submission)
        .await
        .unwrap_err();

    assert!(matches!(err, SubmissionError::Validation(_)));
    assert_eq!(err.http_status(), 422);
    assert_eq!(harness.store.profile_count(), 0);
    assert_eq!(harness.events.event_count(), 0);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected_case_insensitively() {
    // Arrange
    let harness = TestHarness::new();
    let first = SubmissionBuilder::new().with_email("ada@example.com").build();
    harness.service.submit(&harness.ctx, first).await.unwrap();

    // Act
    let second = SubmissionBuilder::new().with_email("Ada@Example.com").build();
    let err = harness
        .service
        .submit(&harness.ctx, second)
        .await
        .unwrap_err();

    // Assert
    assert!(matches!(err, SubmissionError::DuplicateEmail(_)));
    assert_eq!(err.user_message(), "An account with this email already exists");
    assert_eq!(harness.store.profile_count(), 1);
}

#[tokio::test]
async fn test_failed_child_insert_rolls_back_everything() {
    // Arrange
    let inner = InMemoryProfileStore::new();
    let store = FaultyProfileStore::failing_on(inner.clone(), Relation::References);
    let events = Arc::new(RecordingEventPublisher::new());
    let service = ProfileService::new(Arc::new(store), Arc::clone(&events), ServiceConfig::default());
    let ctx = ServiceContext::new("atomicity");

    // Act
    let err = service.submit(&ctx, valid_submission()).await.unwrap_err();

    // Assert
    assert_eq!(err, SubmissionError::persistence());
    assert_eq!(err.user_message(), SubmissionError::PERSISTENCE_MESSAGE);
    assert_eq!(inner.profile_count(), 0);
    assert_eq!(events.event_count(), 0);
}

#[tokio::test]
async fn test_replace_children_with_shorter_list() {
    // Arrange
    let harness = TestHarness::new();
    let submission = SubmissionBuilder::new()
        .with_skills(vec![
            skill("Statistics", SkillLevel::Expert),
            skill("Field surveys", SkillLevel::Advanced),
            skill("Mapping", SkillLevel::Intermediate),
        ])
        .build();
    let created = harness.service.submit(&harness.ctx, submission).await.unwrap();
    assert_eq!(created.skills.len(), 3);

    // Act
    let mut replacement = skill("Modelling", SkillLevel::Beginner);
    replacement.endorsements = 7;
    let updated = harness
        .service
        .replace_children(&harness.ctx, created.id, ChildRows::Skills(vec![replacement]))
        .await
        .unwrap();

    // Assert
    assert_eq!(updated.skills.len(), 1);
    assert_eq!(updated.skills[0].data.name, "Modelling");
    assert_eq!(updated.skills[0].data.endorsements, 0);
    assert!(created.skills.iter().all(|old| old.id != updated.skills[0].id));
    // Other relations are untouched
    assert_eq!(updated.languages, created.languages);
    assert_eq!(updated.references, created.references);
    assert!(harness.events.events().contains(&ServiceEvent::ChildrenReplaced {
        profile_id: created.id,
        relation: Relation::Skills,
    }));
}

#[tokio::test]
async fn test_replace_children_validates_rows() {
    let harness = TestHarness::new();
    let created = harness
        .service
        .submit(&harness.ctx, valid_submission())
        .await
        .unwrap();

    let err = harness
        .service
        .replace_children(&harness.ctx, created.id, ChildRows::References(vec![reference()]))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmissionError::Validation(_)));
    let stored = harness.service.get(&harness.ctx, created.id).await.unwrap();
    assert_eq!(stored.references.len(), 2);
}

#[tokio::test]
async fn test_replace_children_on_missing_profile() {
    let harness = TestHarness::new();
    let missing = ProfileId::new();

    let err = harness
        .service
        .replace_children(
            &harness.ctx,
            missing,
            ChildRows::Publications(vec![publication()]),
        )
        .await
        .unwrap_err();

    assert_eq!(err, SubmissionError::NotFound(missing));
}

#[tokio::test]
async fn test_get_missing_profile() {
    let harness = TestHarness::new();
    let missing = ProfileId::new();

    let err = harness.service.get(&harness.ctx, missing).await.unwrap_err();

    assert_eq!(err, SubmissionError::NotFound(missing));
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn test_full_update_replaces_scalars_and_relations() {
    let harness = TestHarness::new();
    let created = harness
        .service
        .submit(&harness.ctx, valid_submission())
        .await
        .unwrap();

    let edited = SubmissionBuilder::from_submission(created.to_submission())
        .with_full_name("Grace Hopper")
        .with_publications(Vec::new())
        .with_reference_count(3)
        .build();
    let updated = harness
        .service
        .update(&harness.ctx, created.id, edited)
        .await
        .unwrap();

    assert_eq!(updated.fields.full_name, "Grace Hopper");
    assert!(updated.publications.is_empty());
    assert_eq!(updated.references.len(), 3);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_update_refuses_email_of_another_profile() {
    let harness = TestHarness::new();
    let ada = harness
        .service
        .submit(&harness.ctx, SubmissionBuilder::new().with_email("ada@example.com").build())
        .await
        .unwrap();
    let grace = harness
        .service
        .submit(&harness.ctx, valid_submission())
        .await
        .unwrap();

    let err = harness
        .service
        .update_scalar_fields(
            &harness.ctx,
            grace.id,
            ScalarUpdate {
                full_name: grace.fields.full_name.clone(),
                email: ada.fields.email.to_uppercase(),
                bio: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SubmissionError::DuplicateEmail(_)));
}

#[tokio::test]
async fn test_scalar_update_keeps_relations_and_bio() {
    let harness = TestHarness::new();
    let created = harness
        .service
        .submit(&harness.ctx, valid_submission())
        .await
        .unwrap();
    let name: String = Name().fake();

    let updated = harness
        .service
        .update_scalar_fields(
            &harness.ctx,
            created.id,
            ScalarUpdate {
                full_name: name.clone(),
                // Keeping one's own email is not a conflict
                email: created.fields.email.clone(),
                bio: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.fields.full_name, name);
    assert_eq!(updated.fields.bio, created.fields.bio);
    assert_eq!(updated.skills, created.skills);
}

#[tokio::test]
async fn test_scalar_update_validates_input() {
    let harness = TestHarness::new();
    let created = harness
        .service
        .submit(&harness.ctx, valid_submission())
        .await
        .unwrap();

    let err = harness
        .service
        .update_scalar_fields(
            &harness.ctx,
            created.id,
            ScalarUpdate {
                full_name: String::new(),
                email: "not-an-email".to_string(),
                bio: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.field_errors().map(|e| e.len()), Some(2));
}

#[tokio::test]
async fn test_review_approval_verifies_profile() {
    let harness = TestHarness::new();
    let created = harness
        .service
        .submit(&harness.ctx, valid_submission())
        .await
        .unwrap();

    let reviewed = harness
        .service
        .review(&harness.ctx, created.id, ReviewStatus::Approved)
        .await
        .unwrap();
    assert_eq!(reviewed.review_status, ReviewStatus::Approved);
    assert!(reviewed.is_verified);

    let reviewed = harness
        .service
        .review(&harness.ctx, created.id, ReviewStatus::MoreInfoNeeded)
        .await
        .unwrap();
    assert!(!reviewed.is_verified);

    let err = harness
        .service
        .review(&harness.ctx, ProfileId::new(), ReviewStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_removes_profile() {
    let harness = TestHarness::new();
    let created = harness
        .service
        .submit(&harness.ctx, valid_submission())
        .await
        .unwrap();

    harness.service.delete(&harness.ctx, created.id).await.unwrap();

    assert_eq!(harness.store.profile_count(), 0);
    assert_eq!(
        harness.service.delete(&harness.ctx, created.id).await,
        Err(SubmissionError::NotFound(created.id))
    );
    // The email is free again
    let again = SubmissionBuilder::new().with_email(created.fields.email).build();
    assert!(harness.service.submit(&harness.ctx, again).await.is_ok());
}

#[tokio::test]
async fn test_list_pages_newest_first_and_searches() {
    let harness = TestHarness::with_config(ServiceConfig {
        cache_enabled: false,
        ..ServiceConfig::default()
    });
    let mut ids = Vec::new();
    for i in 0..5 {
        let submission = SubmissionBuilder::new()
            .with_full_name(format!("Expert {}", i))
            .build();
        ids.push(harness.service.submit(&harness.ctx, submission).await.unwrap().id);
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let page = harness
        .service
        .list(&harness.ctx, None, 1, Some(2))
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, ids[4]);

    let last = harness
        .service
        .list(&harness.ctx, None, 3, Some(2))
        .await
        .unwrap();
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].id, ids[0]);

    let found = harness
        .service
        .list(&harness.ctx, Some("  expert 3 "), 1, None)
        .await
        .unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].full_name, "Expert 3");
}

#[tokio::test]
async fn test_list_uses_configured_default_page_size() {
    let harness = TestHarness::with_config(ServiceConfig {
        default_page_size: 2,
        cache_enabled: false,
        ..ServiceConfig::default()
    });
    for _ in 0..3 {
        harness
            .service
            .submit(&harness.ctx, valid_submission())
            .await
            .unwrap();
    }

    let page = harness.service.list(&harness.ctx, None, 1, None).await.unwrap();

    assert_eq!(page.per_page, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages, 2);

    let explicit = harness
        .service
        .list(&harness.ctx, None, 1, Some(3))
        .await
        .unwrap();
    assert_eq!(explicit.items.len(), 3);
}

#[tokio::test]
async fn test_list_cache_is_invalidated_by_writes() {
    let harness = TestHarness::new();
    harness
        .service
        .submit(&harness.ctx, valid_submission())
        .await
        .unwrap();

    let before = harness
        .service
        .list(&harness.ctx, None, 1, None)
        .await
        .unwrap();
    assert_eq!(before.total, 1);

    let created = harness
        .service
        .submit(&harness.ctx, valid_submission())
        .await
        .unwrap();
    let after = harness
        .service
        .list(&harness.ctx, None, 1, None)
        .await
        .unwrap();
    assert_eq!(after.total, 2);

    harness.service.delete(&harness.ctx, created.id).await.unwrap();
    let after_delete = harness
        .service
        .list(&harness.ctx, None, 1, None)
        .await
        .unwrap();
    assert_eq!(after_delete.total, 1);
}

#[tokio::test]
async fn test_failed_event_publish_does_not_fail_write() {
    let store = InMemoryProfileStore::new();
    let service = ProfileService::new(
        Arc::new(store.clone()),
        Arc::new(RecordingEventPublisher::failing()),
        ServiceConfig::default(),
    );

    let result = service
        .submit(&ServiceContext::new("events"), valid_submission())
        .await;

    assert!(result.is_ok());
    assert_eq!(store.profile_count(), 1);
}
