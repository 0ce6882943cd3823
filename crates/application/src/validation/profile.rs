//! Expert submission schema.
//!
//! Three entry points share the same section rules:
//! - [`validate_full`] checks a whole submission before it is persisted
//! - [`validate_paths`] checks only the subtrees a wizard step owns
//! - [`validate_relation`] checks one replacement collection on the edit path

use super::{Validatable, ValidationRules};
use expert_roster_domain::{
    Certification, CertificationField, ChildRows, Education, EducationField, ExpertSubmission,
    Experience, ExperienceField, Expertise, ExpertiseField, FieldErrors, FieldPath, Language,
    LanguageField, PersonalInfo, PersonalInfoField, Publication, PublicationField, Reference,
    ReferenceField, ScalarUpdate, Section, Skill, SkillField,
};
use std::collections::BTreeSet;

/// Rule bounds
pub const MIN_FULL_NAME_CHARS: usize = 2;
pub const MIN_BIO_CHARS: usize = 100;
pub const MAX_BIO_CHARS: usize = 500;
pub const MIN_PHONE_CHARS: usize = 10;
pub const MIN_REFERENCES: usize = 2;

/// User-facing validation messages
pub mod messages {
    pub const FULL_NAME_TOO_SHORT: &str = "Full name must be at least 2 characters";
    pub const FULL_NAME_REQUIRED: &str = "Full name is required";
    pub const INVALID_EMAIL: &str = "Invalid email address";
    pub const BIO_TOO_SHORT: &str = "Bio must be at least 100 characters";
    pub const BIO_TOO_LONG: &str = "Bio cannot exceed 500 characters";

    pub const EXPERTISE_AREAS_REQUIRED: &str = "At least one expertise area is required";
    pub const YEARS_NEGATIVE: &str = "Years of experience cannot be negative";

    pub const EXPERIENCES_REQUIRED: &str = "At least one experience entry is required";
    pub const ROLE_REQUIRED: &str = "Role is required";
    pub const ORGANIZATION_REQUIRED: &str = "Organization is required";
    pub const START_DATE_REQUIRED: &str = "Start date is required";

    pub const LANGUAGES_REQUIRED: &str = "At least one language is required";
    pub const LANGUAGE_REQUIRED: &str = "Language is required";
    pub const PROFICIENCY_REQUIRED: &str = "Proficiency level is required";

    pub const SKILLS_REQUIRED: &str = "At least one skill is required";
    pub const SKILL_NAME_REQUIRED: &str = "Skill name is required";
    pub const CATEGORY_REQUIRED: &str = "Category is required";
    pub const LEVEL_REQUIRED: &str = "Level is required";

    pub const EDUCATION_REQUIRED: &str = "At least one education entry is required";
    pub const DEGREE_REQUIRED: &str = "Degree is required";
    pub const FIELD_OF_STUDY_REQUIRED: &str = "Field of study is required";
    pub const INSTITUTION_REQUIRED: &str = "Institution is required";
    pub const YEAR_REQUIRED: &str = "Year is required";

    pub const TITLE_REQUIRED: &str = "Title is required";
    pub const ISSUER_REQUIRED: &str = "Issuer is required";
    pub const ISSUE_DATE_REQUIRED: &str = "Issue date is required";
    pub const JOURNAL_REQUIRED: &str = "Journal is required";

    pub const NAME_REQUIRED: &str = "Name is required";
    pub const POSITION_REQUIRED: &str = "Position is required";
    pub const PHONE_TOO_SHORT: &str = "Phone number must be at least 10 characters";
    pub const RELATIONSHIP_REQUIRED: &str = "Relationship is required";
    pub const REFERENCES_REQUIRED: &str = "At least two references are required";
}

/// Validate every field of a submission.
///
/// Returns the submission unchanged when it is valid.
pub fn validate_full(submission: ExpertSubmission) -> Result<ExpertSubmission, FieldErrors> {
    submission.validate_all().into_result().map(|()| submission)
}

/// Validate only the subtrees rooted at `roots`.
///
/// Sections that no root touches are not evaluated at all; errors from a
/// touched section that fall outside every root are dropped.
pub fn validate_paths(submission: &ExpertSubmission, roots: &[FieldPath]) -> Result<(), FieldErrors> {
    let sections: BTreeSet<Section> = roots.iter().map(FieldPath::section).collect();

    let mut errors = FieldErrors::new();
    for section in sections {
        validate_section(submission, section, &mut errors);
    }

    errors.retain_within(roots);
    errors.into_result()
}

/// Validate one relation's replacement rows, including its minimum row count.
pub fn validate_relation(rows: &ChildRows) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    match rows {
        ChildRows::Skills(rows) => validate_skills(rows, &mut errors),
        ChildRows::Languages(rows) => validate_languages(rows, &mut errors),
        ChildRows::Experiences(rows) => validate_experiences(rows, &mut errors),
        ChildRows::Education(rows) => validate_education(rows, &mut errors),
        ChildRows::Certifications(rows) => validate_certifications(rows, &mut errors),
        ChildRows::Publications(rows) => validate_publications(rows, &mut errors),
        ChildRows::References(rows) => validate_references(rows, &mut errors),
    }

    errors.into_result()
}

impl Validatable for ExpertSubmission {
    fn validate_all(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for section in [
            Section::PersonalInfo,
            Section::Expertise,
            Section::Education,
            Section::Certifications,
            Section::Publications,
            Section::References,
        ] {
            validate_section(self, section, &mut errors);
        }
        errors
    }
}

impl Validatable for ScalarUpdate {
    fn validate_all(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        ValidationRules::required(
            &mut errors,
            FieldPath::personal(PersonalInfoField::FullName),
            &self.full_name,
            messages::FULL_NAME_REQUIRED,
        );
        ValidationRules::email(
            &mut errors,
            FieldPath::personal(PersonalInfoField::Email),
            &self.email,
        );

        errors
    }
}

fn validate_section(submission: &ExpertSubmission, section: Section, errors: &mut FieldErrors) {
    match section {
        Section::PersonalInfo => validate_personal_info(&submission.personal_info, errors),
        Section::Expertise => validate_expertise(&submission.expertise, errors),
        Section::Education => validate_education(&submission.education, errors),
        Section::Certifications => validate_certifications(&submission.certifications, errors),
        Section::Publications => validate_publications(&submission.publications, errors),
        Section::References => validate_references(&submission.references, errors),
    }
}

pub fn validate_personal_info(info: &PersonalInfo, errors: &mut FieldErrors) {
    ValidationRules::min_chars(
        errors,
        FieldPath::personal(PersonalInfoField::FullName),
        &info.full_name,
        MIN_FULL_NAME_CHARS,
        messages::FULL_NAME_TOO_SHORT,
    );

    ValidationRules::email(errors, FieldPath::personal(PersonalInfoField::Email), &info.email);

    let bio = FieldPath::personal(PersonalInfoField::Bio);
    if ValidationRules::min_chars(errors, bio, &info.bio, MIN_BIO_CHARS, messages::BIO_TOO_SHORT) {
        ValidationRules::max_chars(errors, bio, &info.bio, MAX_BIO_CHARS, messages::BIO_TOO_LONG);
    }
}

/// Expertise scalars plus the experiences, languages and skills lists
pub fn validate_expertise(expertise: &Expertise, errors: &mut FieldErrors) {
    ValidationRules::min_items(
        errors,
        FieldPath::expertise(ExpertiseField::ExpertiseAreas),
        expertise.expertise_areas.len(),
        1,
        messages::EXPERTISE_AREAS_REQUIRED,
    );

    if expertise.years_experience < 0 {
        errors.add(
            FieldPath::expertise(ExpertiseField::YearsExperience),
            messages::YEARS_NEGATIVE,
        );
    }

    validate_experiences(&expertise.experiences, errors);
    validate_languages(&expertise.languages, errors);
    validate_skills(&expertise.skills, errors);
}

pub fn validate_experiences(rows: &[Experience], errors: &mut FieldErrors) {
    ValidationRules::min_items(
        errors,
        FieldPath::Experiences(None),
        rows.len(),
        1,
        messages::EXPERIENCES_REQUIRED,
    );

    for (i, row) in rows.iter().enumerate() {
        ValidationRules::required(
            errors,
            FieldPath::experience(i, ExperienceField::Role),
            &row.role,
            messages::ROLE_REQUIRED,
        );
        ValidationRules::required(
            errors,
            FieldPath::experience(i, ExperienceField::Organization),
            &row.organization,
            messages::ORGANIZATION_REQUIRED,
        );
        ValidationRules::required_value(
            errors,
            FieldPath::experience(i, ExperienceField::StartDate),
            &row.start_date,
            messages::START_DATE_REQUIRED,
        );
    }
}

pub fn validate_languages(rows: &[Language], errors: &mut FieldErrors) {
    ValidationRules::min_items(
        errors,
        FieldPath::Languages(None),
        rows.len(),
        1,
        messages::LANGUAGES_REQUIRED,
    );

    for (i, row) in rows.iter().enumerate() {
        ValidationRules::required(
            errors,
            FieldPath::language(i, LanguageField::Name),
            &row.name,
            messages::LANGUAGE_REQUIRED,
        );
        ValidationRules::required_value(
            errors,
            FieldPath::language(i, LanguageField::Proficiency),
            &row.proficiency,
            messages::PROFICIENCY_REQUIRED,
        );
    }
}

pub fn validate_skills(rows: &[Skill], errors: &mut FieldErrors) {
    ValidationRules::min_items(
        errors,
        FieldPath::Skills(None),
        rows.len(),
        1,
        messages::SKILLS_REQUIRED,
    );

    for (i, row) in rows.iter().enumerate() {
        ValidationRules::required(
            errors,
            FieldPath::skill(i, SkillField::Name),
            &row.name,
            messages::SKILL_NAME_REQUIRED,
        );
        ValidationRules::required(
            errors,
            FieldPath::skill(i, SkillField::Category),
            &row.category,
            messages::CATEGORY_REQUIRED,
        );
        ValidationRules::required_value(
            errors,
            FieldPath::skill(i, SkillField::Level),
            &row.level,
            messages::LEVEL_REQUIRED,
        );
    }
}

pub fn validate_education(rows: &[Education], errors: &mut FieldErrors) {
    ValidationRules::min_items(
        errors,
        FieldPath::Education(None),
        rows.len(),
        1,
        messages::EDUCATION_REQUIRED,
    );

    for (i, row) in rows.iter().enumerate() {
        for (field, value, message) in [
            (EducationField::Degree, &row.degree, messages::DEGREE_REQUIRED),
            (EducationField::Field, &row.field, messages::FIELD_OF_STUDY_REQUIRED),
            (EducationField::Institution, &row.institution, messages::INSTITUTION_REQUIRED),
            (EducationField::Year, &row.year, messages::YEAR_REQUIRED),
        ] {
            ValidationRules::required(errors, FieldPath::education(i, field), value, message);
        }
    }
}

/// Certifications are optional; each entry that is present must be complete
pub fn validate_certifications(rows: &[Certification], errors: &mut FieldErrors) {
    for (i, row) in rows.iter().enumerate() {
        ValidationRules::required(
            errors,
            FieldPath::certification(i, CertificationField::Title),
            &row.title,
            messages::TITLE_REQUIRED,
        );
        ValidationRules::required(
            errors,
            FieldPath::certification(i, CertificationField::Issuer),
            &row.issuer,
            messages::ISSUER_REQUIRED,
        );
        ValidationRules::required_value(
            errors,
            FieldPath::certification(i, CertificationField::IssueDate),
            &row.issue_date,
            messages::ISSUE_DATE_REQUIRED,
        );
    }
}

pub fn validate_publications(rows: &[Publication], errors: &mut FieldErrors) {
    for (i, row) in rows.iter().enumerate() {
        for (field, value, message) in [
            (PublicationField::Title, &row.title, messages::TITLE_REQUIRED),
            (PublicationField::Journal, &row.journal, messages::JOURNAL_REQUIRED),
            (PublicationField::Year, &row.year, messages::YEAR_REQUIRED),
        ] {
            ValidationRules::required(errors, FieldPath::publication(i, field), value, message);
        }
    }
}

pub fn validate_references(rows: &[Reference], errors: &mut FieldErrors) {
    ValidationRules::min_items(
        errors,
        FieldPath::References(None),
        rows.len(),
        MIN_REFERENCES,
        messages::REFERENCES_REQUIRED,
    );

    for (i, row) in rows.iter().enumerate() {
        for (field, value, message) in [
            (ReferenceField::Name, &row.name, messages::NAME_REQUIRED),
            (ReferenceField::Position, &row.position, messages::POSITION_REQUIRED),
            (ReferenceField::Organization, &row.organization, messages::ORGANIZATION_REQUIRED),
            (ReferenceField::Relationship, &row.relationship, messages::RELATIONSHIP_REQUIRED),
        ] {
            ValidationRules::required(errors, FieldPath::reference(i, field), value, message);
        }

        ValidationRules::email(errors, FieldPath::reference(i, ReferenceField::Email), &row.email);
        ValidationRules::min_chars(
            errors,
            FieldPath::reference(i, ReferenceField::Phone),
            &row.phone,
            MIN_PHONE_CHARS,
            messages::PHONE_TOO_SHORT,
        );
    }
}
