//! Step editors of the registration wizard.
//!
//! Each editor borrows the slice of the draft submission its step owns and
//! exposes add/remove/update operations over that slice. Nothing here is
//! persisted: edits only change the in-progress draft.

use crate::validation::{
    validate_certifications, validate_education, validate_expertise, validate_personal_info,
    validate_publications, validate_references, MIN_REFERENCES,
};
use chrono::NaiveDate;
use expert_roster_domain::{
    Certification, Education, ExpertSubmission, Experience, ExperienceField, Expertise,
    ExpertiseField, FieldErrors, FieldPath, Language, PersonalInfo, Proficiency, Publication,
    Reference, Relation, Skill, SkillLevel, VerificationStatus,
};
use std::collections::BTreeSet;
use thiserror::Error;

/// Shown on the references step while fewer than two rows exist
pub const REFERENCES_HINT: &str = "Please provide at least 2 professional references";

/// One page of the registration wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    PersonalInfo = 1,
    Expertise = 2,
    Education = 3,
    Certifications = 4,
    Publications = 5,
    References = 6,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::PersonalInfo,
        Step::Expertise,
        Step::Education,
        Step::Certifications,
        Step::Publications,
        Step::References,
    ];

    pub const FIRST: Step = Step::PersonalInfo;
    pub const LAST: Step = Step::References;

    /// 1-based position in the wizard
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == number)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::PersonalInfo => "Personal Information",
            Step::Expertise => "Expertise & Skills",
            Step::Education => "Education",
            Step::Certifications => "Certifications",
            Step::Publications => "Publications",
            Step::References => "References",
        }
    }

    /// Field-path roots validated before leaving this step
    pub fn field_paths(&self) -> &'static [FieldPath] {
        match self {
            Step::PersonalInfo => &[FieldPath::PersonalInfo(None)],
            Step::Expertise => &[
                FieldPath::Expertise(Some(ExpertiseField::ExpertiseAreas)),
                FieldPath::Expertise(Some(ExpertiseField::YearsExperience)),
                FieldPath::Experiences(None),
                FieldPath::Languages(None),
                FieldPath::Skills(None),
            ],
            Step::Education => &[FieldPath::Education(None)],
            Step::Certifications => &[FieldPath::Certifications(None)],
            Step::Publications => &[FieldPath::Publications(None)],
            Step::References => &[FieldPath::References(None)],
        }
    }

    /// Following step, saturating at the last one
    pub fn next(&self) -> Step {
        Self::from_number(self.number() + 1).unwrap_or(Self::LAST)
    }

    /// Preceding step, saturating at the first one
    pub fn previous(&self) -> Step {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(Self::FIRST)
    }

    pub fn is_last(&self) -> bool {
        *self == Self::LAST
    }
}

/// Rejected step edit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("No {relation} row at index {index}")]
    IndexOutOfRange { relation: Relation, index: usize },

    #[error("The first {minimum} {relation} rows cannot be removed")]
    BelowMinimumRows { relation: Relation, minimum: usize },

    #[error("{0} cannot be edited")]
    FieldDisabled(FieldPath),
}

/// A step editor bound to its slice of the draft
pub trait StepForm {
    fn step(&self) -> Step;

    /// Errors for the bound slice only
    fn errors(&self) -> FieldErrors;

    fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }
}

/// A single-field change to one row of a list
pub trait RowUpdate<T> {
    fn apply(self, index: usize, row: &mut T) -> Result<(), StepError>;
}

/// Add/remove/update over one list of the draft.
///
/// The first `pinned` rows can never be removed.
#[derive(Debug)]
pub struct ListEditor<'a, T> {
    rows: &'a mut Vec<T>,
    relation: Relation,
    pinned: usize,
}

impl<'a, T: Default> ListEditor<'a, T> {
    pub fn new(rows: &'a mut Vec<T>, relation: Relation) -> Self {
        Self {
            rows,
            relation,
            pinned: 0,
        }
    }

    pub fn pinned(rows: &'a mut Vec<T>, relation: Relation, pinned: usize) -> Self {
        Self {
            rows,
            relation,
            pinned,
        }
    }

    pub fn rows(&self) -> &[T] {
        self.rows.as_slice()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row with default values and return its index
    pub fn add(&mut self) -> usize {
        self.rows.push(T::default());
        self.rows.len() - 1
    }

    /// Whether the row at `index` offers a remove action
    pub fn can_remove(&self, index: usize) -> bool {
        index >= self.pinned && index < self.rows.len()
    }

    /// Remove a row; later rows shift down by one
    pub fn remove(&mut self, index: usize) -> Result<T, StepError> {
        self.check_index(index)?;
        if index < self.pinned {
            return Err(StepError::BelowMinimumRows {
                relation: self.relation,
                minimum: self.pinned,
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Change one field of one row, leaving its other fields untouched
    pub fn update<U: RowUpdate<T>>(&mut self, index: usize, update: U) -> Result<(), StepError> {
        self.check_index(index)?;
        update.apply(index, &mut self.rows[index])
    }

    fn check_index(&self, index: usize) -> Result<(), StepError> {
        if index >= self.rows.len() {
            return Err(StepError::IndexOutOfRange {
                relation: self.relation,
                index,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Row updates
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperienceUpdate {
    Role(String),
    Organization(String),
    Location(Option<String>),
    StartDate(Option<NaiveDate>),
    EndDate(Option<NaiveDate>),
    Current(bool),
    Description(Option<String>),
    Skills(BTreeSet<String>),
}

impl RowUpdate<Experience> for ExperienceUpdate {
    fn apply(self, index: usize, row: &mut Experience) -> Result<(), StepError> {
        match self {
            Self::Role(v) => row.role = v,
            Self::Organization(v) => row.organization = v,
            Self::Location(v) => row.location = v,
            Self::StartDate(v) => row.start_date = v,
            // The stored end date is kept while the position is current.
            Self::EndDate(_) if row.current => {
                return Err(StepError::FieldDisabled(FieldPath::experience(
                    index,
                    ExperienceField::EndDate,
                )))
            }
            Self::EndDate(v) => row.end_date = v,
            Self::Current(v) => row.current = v,
            Self::Description(v) => row.description = v,
            Self::Skills(v) => row.skills = v,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageUpdate {
    Name(String),
    Proficiency(Proficiency),
}

impl RowUpdate<Language> for LanguageUpdate {
    fn apply(self, _index: usize, row: &mut Language) -> Result<(), StepError> {
        match self {
            Self::Name(v) => row.name = v,
            Self::Proficiency(v) => row.proficiency = Some(v),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillUpdate {
    Name(String),
    Category(String),
    Level(SkillLevel),
}

impl RowUpdate<Skill> for SkillUpdate {
    fn apply(self, _index: usize, row: &mut Skill) -> Result<(), StepError> {
        match self {
            Self::Name(v) => row.name = v,
            Self::Category(v) => row.category = v,
            Self::Level(v) => row.level = Some(v),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EducationUpdate {
    Degree(String),
    Field(String),
    Institution(String),
    Year(String),
}

impl RowUpdate<Education> for EducationUpdate {
    fn apply(self, _index: usize, row: &mut Education) -> Result<(), StepError> {
        match self {
            Self::Degree(v) => row.degree = v,
            Self::Field(v) => row.field = v,
            Self::Institution(v) => row.institution = v,
            Self::Year(v) => row.year = v,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificationUpdate {
    Title(String),
    Issuer(String),
    IssueDate(Option<NaiveDate>),
    ExpiryDate(Option<NaiveDate>),
    DocumentUrl(Option<String>),
    VerificationStatus(VerificationStatus),
}

impl RowUpdate<Certification> for CertificationUpdate {
    fn apply(self, _index: usize, row: &mut Certification) -> Result<(), StepError> {
        match self {
            Self::Title(v) => row.title = v,
            Self::Issuer(v) => row.issuer = v,
            Self::IssueDate(v) => row.issue_date = v,
            Self::ExpiryDate(v) => row.expiry_date = v,
            Self::DocumentUrl(v) => row.document_url = v,
            Self::VerificationStatus(v) => row.verification_status = Some(v),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicationUpdate {
    Title(String),
    Journal(String),
    Year(String),
    Url(Option<String>),
}

impl RowUpdate<Publication> for PublicationUpdate {
    fn apply(self, _index: usize, row: &mut Publication) -> Result<(), StepError> {
        match self {
            Self::Title(v) => row.title = v,
            Self::Journal(v) => row.journal = v,
            Self::Year(v) => row.year = v,
            Self::Url(v) => row.url = v,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceUpdate {
    Name(String),
    Position(String),
    Organization(String),
    Email(String),
    Phone(String),
    Relationship(String),
}

impl RowUpdate<Reference> for ReferenceUpdate {
    fn apply(self, _index: usize, row: &mut Reference) -> Result<(), StepError> {
        match self {
            Self::Name(v) => row.name = v,
            Self::Position(v) => row.position = v,
            Self::Organization(v) => row.organization = v,
            Self::Email(v) => row.email = v,
            Self::Phone(v) => row.phone = v,
            Self::Relationship(v) => row.relationship = v,
        }
        Ok(())
    }
}

// ============================================================================
// Step editors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonalInfoUpdate {
    FullName(String),
    Email(String),
    Bio(String),
    Country(Option<String>),
    Region(Option<String>),
}

/// Step 1
#[derive(Debug)]
pub struct PersonalInfoStep<'a> {
    info: &'a mut PersonalInfo,
}

impl<'a> PersonalInfoStep<'a> {
    pub fn new(info: &'a mut PersonalInfo) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &PersonalInfo {
        &*self.info
    }

    pub fn update(&mut self, update: PersonalInfoUpdate) {
        match update {
            PersonalInfoUpdate::FullName(v) => self.info.full_name = v,
            PersonalInfoUpdate::Email(v) => self.info.email = v,
            PersonalInfoUpdate::Bio(v) => self.info.bio = v,
            PersonalInfoUpdate::Country(v) => self.info.country = v,
            PersonalInfoUpdate::Region(v) => self.info.region = v,
        }
    }

    /// Characters typed into the bio so far
    pub fn bio_length(&self) -> usize {
        self.info.bio.chars().count()
    }
}

impl StepForm for PersonalInfoStep<'_> {
    fn step(&self) -> Step {
        Step::PersonalInfo
    }

    fn errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        validate_personal_info(&*self.info, &mut errors);
        errors
    }
}

/// Step 2: expertise scalars and three independent lists
#[derive(Debug)]
pub struct ExpertiseStep<'a> {
    expertise: &'a mut Expertise,
}

impl<'a> ExpertiseStep<'a> {
    pub fn new(expertise: &'a mut Expertise) -> Self {
        Self { expertise }
    }

    pub fn expertise(&self) -> &Expertise {
        &*self.expertise
    }

    /// Toggle an expertise area; returns whether it is now selected
    pub fn toggle_area(&mut self, area: &str) -> bool {
        if self.expertise.expertise_areas.remove(area) {
            false
        } else {
            self.expertise.expertise_areas.insert(area.to_string())
        }
    }

    pub fn set_years_experience(&mut self, years: i32) {
        self.expertise.years_experience = years;
    }

    pub fn skills(&mut self) -> ListEditor<'_, Skill> {
        ListEditor::new(&mut self.expertise.skills, Relation::Skills)
    }

    pub fn languages(&mut self) -> ListEditor<'_, Language> {
        ListEditor::new(&mut self.expertise.languages, Relation::Languages)
    }

    pub fn experiences(&mut self) -> ListEditor<'_, Experience> {
        ListEditor::new(&mut self.expertise.experiences, Relation::Experiences)
    }

    /// Whether the end-date input of an experience row accepts edits
    pub fn end_date_enabled(&self, index: usize) -> bool {
        self.expertise
            .experiences
            .get(index)
            .is_some_and(|row| !row.current)
    }
}

impl StepForm for ExpertiseStep<'_> {
    fn step(&self) -> Step {
        Step::Expertise
    }

    fn errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        validate_expertise(&*self.expertise, &mut errors);
        errors
    }
}

macro_rules! list_step {
    ($(#[$meta:meta])* $name:ident, $row:ty, $step:expr, $relation:expr, $validate:path) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name<'a> {
            rows: &'a mut Vec<$row>,
        }

        impl<'a> $name<'a> {
            pub fn new(rows: &'a mut Vec<$row>) -> Self {
                Self { rows }
            }

            pub fn rows(&mut self) -> ListEditor<'_, $row> {
                ListEditor::new(&mut *self.rows, $relation)
            }
        }

        impl StepForm for $name<'_> {
            fn step(&self) -> Step {
                $step
            }

            fn errors(&self) -> FieldErrors {
                let mut errors = FieldErrors::new();
                $validate(self.rows.as_slice(), &mut errors);
                errors
            }
        }
    };
}

list_step!(
    /// Step 3
    EducationStep, Education, Step::Education, Relation::Education, validate_education
);
list_step!(
    /// Step 4
    CertificationsStep,
    Certification,
    Step::Certifications,
    Relation::Certifications,
    validate_certifications
);
list_step!(
    /// Step 5
    PublicationsStep,
    Publication,
    Step::Publications,
    Relation::Publications,
    validate_publications
);

/// Step 6. The first two rows are always shown and cannot be removed.
#[derive(Debug)]
pub struct ReferencesStep<'a> {
    rows: &'a mut Vec<Reference>,
}

impl<'a> ReferencesStep<'a> {
    pub fn new(rows: &'a mut Vec<Reference>) -> Self {
        Self { rows }
    }

    pub fn rows(&mut self) -> ListEditor<'_, Reference> {
        ListEditor::pinned(&mut *self.rows, Relation::References, MIN_REFERENCES)
    }

    pub fn hint(&self) -> Option<&'static str> {
        (self.rows.len() < MIN_REFERENCES).then_some(REFERENCES_HINT)
    }
}

impl StepForm for ReferencesStep<'_> {
    fn step(&self) -> Step {
        Step::References
    }

    fn errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        validate_references(self.rows.as_slice(), &mut errors);
        errors
    }
}

/// Fresh registration draft: empty lists except the two pinned reference rows
pub fn new_draft() -> ExpertSubmission {
    ExpertSubmission {
        references: vec![Reference::default(); MIN_REFERENCES],
        ..ExpertSubmission::default()
    }
}
