//! Tests for submission schema validation
//!
//! Boundary behaviour of the bio length rule, per-list minimums, and the
//! minimal end-to-end registration.

use expert_roster_application::validation::{messages, MAX_BIO_CHARS, MIN_BIO_CHARS};
use expert_roster_application::{validate_full, validate_paths, validate_relation, Step};
use expert_roster_domain::{
    ChildRows, FieldPath, PersonalInfoField, Reference, ReferenceField, Relation, SkillField,
};
use expert_roster_testing::{builders::*, fixtures::*};
use proptest::prelude::*;

fn bio_errors(chars: usize) -> Option<String> {
    let submission = SubmissionBuilder::new().with_bio(bio_of_length(chars)).build();
    validate_full(submission)
        .err()
        .and_then(|errors| {
            errors
                .first(&FieldPath::personal(PersonalInfoField::Bio))
                .map(str::to_string)
        })
}

#[test]
fn test_bio_boundaries() {
    assert_eq!(bio_errors(99).as_deref(), Some(messages::BIO_TOO_SHORT));
    assert_eq!(bio_errors(MIN_BIO_CHARS), None);
    assert_eq!(bio_errors(MAX_BIO_CHARS), None);
    assert_eq!(bio_errors(501).as_deref(), Some(messages::BIO_TOO_LONG));
}

proptest! {
    #[test]
    fn prop_bio_within_bounds_is_accepted(chars in MIN_BIO_CHARS..=MAX_BIO_CHARS) {
        prop_assert_eq!(bio_errors(chars), None);
    }

    #[test]
    fn prop_bio_outside_bounds_is_rejected(chars in prop_oneof![0..MIN_BIO_CHARS, (MAX_BIO_CHARS + 1)..800]) {
        prop_assert!(bio_errors(chars).is_some());
    }

    #[test]
    fn prop_short_phone_rejected(phone in "[0-9]{0,9}") {
        let mut short = reference();
        short.phone = phone;
        let rows = ChildRows::References(vec![short, reference()]);

        let errors = validate_relation(&rows).unwrap_err();
        prop_assert_eq!(
            errors.first(&FieldPath::reference(0, ReferenceField::Phone)),
            Some(messages::PHONE_TOO_SHORT)
        );
    }
}

#[test]
fn test_concrete_scenario_is_valid() {
    let submission = concrete_scenario_submission();
    let validated = validate_full(submission.clone()).expect("scenario must validate");
    assert_eq!(validated, submission);
}

#[test]
fn test_missing_lists_are_reported_on_list_paths() {
    let submission = SubmissionBuilder::new()
        .with_skills(Vec::new())
        .with_languages(Vec::new())
        .with_experiences(Vec::new())
        .with_education(Vec::new())
        .without_expertise_areas()
        .with_reference_count(1)
        .build();

    let errors = validate_full(submission).unwrap_err();

    for (path, message) in [
        (FieldPath::Skills(None), messages::SKILLS_REQUIRED),
        (FieldPath::Languages(None), messages::LANGUAGES_REQUIRED),
        (FieldPath::Experiences(None), messages::EXPERIENCES_REQUIRED),
        (FieldPath::Education(None), messages::EDUCATION_REQUIRED),
        (FieldPath::References(None), messages::REFERENCES_REQUIRED),
    ] {
        assert_eq!(errors.first(&path), Some(message), "{}", path);
    }
    assert_eq!(
        errors.first(&FieldPath::expertise(
            expert_roster_domain::ExpertiseField::ExpertiseAreas
        )),
        Some(messages::EXPERTISE_AREAS_REQUIRED)
    );
}

#[test]
fn test_optional_lists_may_be_empty() {
    let submission = SubmissionBuilder::new()
        .with_certifications(Vec::new())
        .with_publications(Vec::new())
        .build();

    assert!(validate_full(submission).is_ok());
}

#[test]
fn test_skill_without_level_is_rejected() {
    let mut submission = valid_submission();
    submission.expertise.skills[0].level = None;

    let errors = validate_full(submission).unwrap_err();
    assert_eq!(
        errors.first(&FieldPath::skill(0, SkillField::Level)),
        Some(messages::LEVEL_REQUIRED)
    );
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_step_paths_validate_only_that_step() {
    let submission = SubmissionBuilder::new()
        .with_bio("short")
        .with_references(vec![Reference::default(), Reference::default()])
        .build();

    assert!(validate_paths(&submission, Step::Expertise.field_paths()).is_ok());
    assert!(validate_paths(&submission, Step::Education.field_paths()).is_ok());

    let personal = validate_paths(&submission, Step::PersonalInfo.field_paths()).unwrap_err();
    assert_eq!(personal.len(), 1);

    let references = validate_paths(&submission, Step::References.field_paths()).unwrap_err();
    assert!(references.contains(&FieldPath::reference(1, ReferenceField::Email)));
    assert!(!references.contains(&FieldPath::personal(PersonalInfoField::Bio)));
}

#[test]
fn test_relation_minimums() {
    for relation in Relation::ALL {
        let empty = ChildRows::from_json(relation, serde_json::json!([])).unwrap();
        let result = validate_relation(&empty);
        assert_eq!(result.is_err(), relation.min_rows() > 0, "{}", relation);
    }
}
