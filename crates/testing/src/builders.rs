//! Fluent builder for constructing submissions in tests.
//!
//! Starts from [`valid_submission`](crate::fixtures::valid_submission) so a
//! test only spells out the fields it cares about.

use expert_roster_domain::{
    Certification, Education, ExpertSubmission, Experience, Language, Publication, Reference,
    Skill,
};

use crate::fixtures::{reference, valid_submission};

/// Builder for creating ExpertSubmission test instances
#[derive(Clone)]
pub struct SubmissionBuilder {
    submission: ExpertSubmission,
}

impl SubmissionBuilder {
    pub fn new() -> Self {
        Self {
            submission: valid_submission(),
        }
    }

    pub fn from_submission(submission: ExpertSubmission) -> Self {
        Self { submission }
    }

    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.submission.personal_info.full_name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.submission.personal_info.email = email.into();
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.submission.personal_info.bio = bio.into();
        self
    }

    pub fn with_years_experience(mut self, years: i32) -> Self {
        self.submission.expertise.years_experience = years;
        self
    }

    pub fn with_expertise_area(mut self, area: impl Into<String>) -> Self {
        self.submission.expertise.expertise_areas.insert(area.into());
        self
    }

    pub fn without_expertise_areas(mut self) -> Self {
        self.submission.expertise.expertise_areas.clear();
        self
    }

    pub fn with_skills(mut self, skills: Vec<Skill>) -> Self {
        self.submission.expertise.skills = skills;
        self
    }

    pub fn with_languages(mut self, languages: Vec<Language>) -> Self {
        self.submission.expertise.languages = languages;
        self
    }

    pub fn with_experiences(mut self, experiences: Vec<Experience>) -> Self {
        self.submission.expertise.experiences = experiences;
        self
    }

    pub fn with_education(mut self, education: Vec<Education>) -> Self {
        self.submission.education = education;
        self
    }

    pub fn with_certifications(mut self, certifications: Vec<Certification>) -> Self {
        self.submission.certifications = certifications;
        self
    }

    pub fn with_publications(mut self, publications: Vec<Publication>) -> Self {
        self.submission.publications = publications;
        self
    }

    pub fn with_references(mut self, references: Vec<Reference>) -> Self {
        self.submission.references = references;
        self
    }

    /// Keep only `count` references, generating more if needed
    pub fn with_reference_count(mut self, count: usize) -> Self {
        self.submission.references.resize_with(count, reference);
        self
    }

    pub fn without_references(self) -> Self {
        self.with_references(Vec::new())
    }

    pub fn build(self) -> ExpertSubmission {
        self.submission
    }
}

impl Default for SubmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
