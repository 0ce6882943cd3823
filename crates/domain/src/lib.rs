//! Expert Roster Domain Types
//!
//! Core domain model for the expert registration and profile management
//! service.
//!
//! ## Modules
//!
//! - **identifiers**: UUID v7 identifiers for profiles and child records
//! - **profile**: Submission draft, persisted profile and enumerations
//! - **relation**: The seven owned child collections and their replacement rows
//! - **field_path**: Typed addresses of fields inside a submission
//! - **validation**: Field-keyed validation errors
//! - **errors**: User-facing submission errors
//!
//! ## Usage
//!
//! ```rust
//! use expert_roster_domain::{FieldPath, SkillField, SkillLevel};
//!
//! let path = FieldPath::skill(0, SkillField::Level);
//! assert_eq!(path.to_string(), "expertise.skills.0.level");
//! assert_eq!("Expert".parse::<SkillLevel>().unwrap(), SkillLevel::Expert);
//! ```

#![warn(clippy::all)]

pub mod errors;
pub mod field_path;
pub mod identifiers;
pub mod profile;
pub mod relation;
pub mod validation;

pub use errors::{ParseError, SubmissionError, SubmissionResult};
pub use field_path::{
    CertificationField, EducationField, ExperienceField, ExpertiseField, FieldPath, Indexed,
    LanguageField, PersonalInfoField, PublicationField, ReferenceField, Section, SkillField,
};
pub use identifiers::{ProfileId, RecordId};
pub use profile::{
    Certification, Education, ExpertSubmission, Experience, Expertise, Language, PersonalInfo,
    Proficiency, Profile, ProfileFields, ProfileSummary, Publication, Record, Reference,
    ReviewStatus, ScalarUpdate, Skill, SkillLevel, VerificationStatus, EXPERTISE_AREAS,
    SKILL_CATEGORIES,
};
pub use relation::{ChildRows, Relation};
pub use validation::FieldErrors;
