//! Expert profile types.
//!
//! `ExpertSubmission` is the in-progress registration document edited by the
//! wizard. Values a fresh form row leaves blank (levels, proficiencies, dates)
//! are optional here and become required once the schema validator runs.
//! `Profile` is the persisted aggregate returned by the profile store.

use crate::errors::ParseError;
use crate::identifiers::{ProfileId, RecordId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Skill categories offered by the expertise step.
pub const SKILL_CATEGORIES: [&str; 3] = ["Technical", "Soft Skills", "Domain Knowledge"];

/// Areas of expertise offered by the expertise step.
pub const EXPERTISE_AREAS: [&str; 3] = ["Public Health", "Environmental Sciences", "Education"];

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl $name {
            /// All values in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable text used in JSON and in the database
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text $(| $alias)* => Ok(Self::$variant),)+
                    other => Err(ParseError::unknown($kind, other)),
                }
            }
        }
    };
}

string_enum!(
    /// Spoken language proficiency
    Proficiency, "proficiency" {
        Basic => "Basic",
        Intermediate => "Intermediate",
        Advanced => "Advanced",
        Native => "Native",
    }
);

string_enum!(
    /// Self-assessed skill level
    SkillLevel, "skill level" {
        Beginner => "Beginner",
        Intermediate => "Intermediate",
        Advanced => "Advanced",
        Expert => "Expert",
    }
);

string_enum!(
    /// Verification state of a certification document
    VerificationStatus, "verification status" {
        Pending => "Pending" | "pending",
        Verified => "Verified" | "verified",
        Expired => "Expired" | "expired",
    }
);

string_enum!(
    /// Administrative review state of a registered profile
    ReviewStatus, "review status" {
        Pending => "pending",
        InReview => "in_review",
        Approved => "approved",
        Rejected => "rejected",
        MoreInfoNeeded => "more_info_needed",
    }
);

impl Default for VerificationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for ReviewStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Form inputs send `""` for an unset date or select. Read that as absent so
/// the validator reports the field as required instead of the whole document
/// failing to parse.
mod blank_as_none {
    use serde::{de, Deserialize, Deserializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.is_empty() => raw.parse().map(Some).map_err(de::Error::custom),
            _ => Ok(None),
        }
    }
}

// ============================================================================
// Submission draft
// ============================================================================

/// Root registration document, transient until persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertSubmission {
    pub personal_info: PersonalInfo,
    pub expertise: Expertise,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub publications: Vec<Publication>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expertise {
    #[serde(default)]
    pub expertise_areas: BTreeSet<String>,
    #[serde(default)]
    pub years_experience: i32,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

/// Work experience entry.
///
/// When `current` is set the end date is not editable in the form, but a
/// previously entered value is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "blank_as_none::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub skills: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub proficiency: Option<Proficiency>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub level: Option<SkillLevel>,
    /// System-assigned; always stored as 0 when the skill is created.
    #[serde(default)]
    pub endorsements: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub issue_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "blank_as_none::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none::deserialize")]
    pub verification_status: Option<VerificationStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub journal: String,
    #[serde(default)]
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub relationship: String,
}

// ============================================================================
// Persisted aggregate
// ============================================================================

/// Scalar columns of the parent profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    pub full_name: String,
    pub email: String,
    pub bio: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub expertise_areas: BTreeSet<String>,
    pub years_experience: i32,
}

impl ProfileFields {
    /// Extract the parent record's columns from a submission.
    pub fn from_submission(submission: &ExpertSubmission) -> Self {
        let info = &submission.personal_info;
        Self {
            full_name: info.full_name.clone(),
            email: info.email.clone(),
            bio: info.bio.clone(),
            country: info.country.clone(),
            region: info.region.clone(),
            expertise_areas: submission.expertise.expertise_areas.clone(),
            years_experience: submission.expertise.years_experience,
        }
    }
}

/// Quick-edit of a profile's identity fields from the admin screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarUpdate {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// A child row as stored: the submitted data plus its identity and owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: RecordId,
    pub profile_id: ProfileId,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Record<T> {
    pub fn new(profile_id: ProfileId, data: T) -> Self {
        Self {
            id: RecordId::new(),
            profile_id,
            data,
        }
    }
}

/// Persisted expert profile with all child collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    #[serde(flatten)]
    pub fields: ProfileFields,
    pub review_status: ReviewStatus,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub experiences: Vec<Record<Experience>>,
    pub languages: Vec<Record<Language>>,
    pub skills: Vec<Record<Skill>>,
    pub education: Vec<Record<Education>>,
    pub certifications: Vec<Record<Certification>>,
    pub publications: Vec<Record<Publication>>,
    pub references: Vec<Record<Reference>>,
}

impl Profile {
    /// Create an empty profile around freshly inserted scalar fields.
    pub fn new(id: ProfileId, fields: ProfileFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            fields,
            review_status: ReviewStatus::Pending,
            is_verified: false,
            created_at: now,
            updated_at: now,
            experiences: Vec::new(),
            languages: Vec::new(),
            skills: Vec::new(),
            education: Vec::new(),
            certifications: Vec::new(),
            publications: Vec::new(),
            references: Vec::new(),
        }
    }

    /// Rebuild the submission document this profile represents.
    ///
    /// Used to prefill the edit form and to compare stored data with what was
    /// submitted.
    pub fn to_submission(&self) -> ExpertSubmission {
        fn data<T: Clone>(rows: &[Record<T>]) -> Vec<T> {
            rows.iter().map(|r| r.data.clone()).collect()
        }

        ExpertSubmission {
            personal_info: PersonalInfo {
                full_name: self.fields.full_name.clone(),
                email: self.fields.email.clone(),
                bio: self.fields.bio.clone(),
                country: self.fields.country.clone(),
                region: self.fields.region.clone(),
            },
            expertise: Expertise {
                expertise_areas: self.fields.expertise_areas.clone(),
                years_experience: self.fields.years_experience,
                experiences: data(&self.experiences),
                languages: data(&self.languages),
                skills: data(&self.skills),
            },
            education: data(&self.education),
            certifications: data(&self.certifications),
            publications: data(&self.publications),
            references: data(&self.references),
        }
    }

    /// List-row projection of this profile.
    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            id: self.id,
            full_name: self.fields.full_name.clone(),
            email: self.fields.email.clone(),
            country: self.fields.country.clone(),
            region: self.fields.region.clone(),
            expertise_areas: self.fields.expertise_areas.clone(),
            years_experience: self.fields.years_experience,
            review_status: self.review_status,
            is_verified: self.is_verified,
            created_at: self.created_at,
        }
    }
}

/// Row shown in the expert list and search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: ProfileId,
    pub full_name: String,
    pub email: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub expertise_areas: BTreeSet<String>,
    pub years_experience: i32,
    pub review_status: ReviewStatus,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_text_round_trip() {
        for level in SkillLevel::ALL {
            assert_eq!(level.as_str().parse::<SkillLevel>().unwrap(), *level);
        }
        assert_eq!("in_review".parse::<ReviewStatus>().unwrap(), ReviewStatus::InReview);
    }

    #[test]
    fn test_verification_status_accepts_lowercase() {
        let status: VerificationStatus = serde_json::from_str("\"verified\"").unwrap();
        assert_eq!(status, VerificationStatus::Verified);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Verified\"");
    }

    #[test]
    fn test_unknown_level_rejected() {
        let err = "Guru".parse::<SkillLevel>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown skill level: Guru");
    }

    #[test]
    fn test_submission_uses_camel_case() {
        let json = serde_json::json!({
            "personalInfo": { "fullName": "Ada", "email": "ada@example.com", "bio": "" },
            "expertise": {
                "expertiseAreas": ["Public Health"],
                "yearsExperience": 3,
                "skills": [{ "name": "X", "category": "Technical", "level": "Expert" }]
            }
        });
        let submission: ExpertSubmission = serde_json::from_value(json).unwrap();
        assert_eq!(submission.personal_info.full_name, "Ada");
        assert_eq!(submission.expertise.skills[0].level, Some(SkillLevel::Expert));
        assert_eq!(submission.expertise.skills[0].endorsements, 0);
        assert!(submission.references.is_empty());
    }

    #[test]
    fn test_blank_dates_and_selects_read_as_unset() {
        let json = serde_json::json!({
            "personalInfo": {},
            "expertise": {
                "experiences": [{ "role": "Lead", "startDate": "", "endDate": null }],
                "languages": [{ "name": "French", "proficiency": "" }],
                "skills": [{ "name": "X", "category": "Technical", "level": "" }]
            },
            "certifications": [{ "title": "T", "issueDate": "2020-05-01", "verificationStatus": "" }]
        });

        let submission: ExpertSubmission = serde_json::from_value(json).unwrap();

        let experience = &submission.expertise.experiences[0];
        assert_eq!(experience.start_date, None);
        assert_eq!(experience.end_date, None);
        assert_eq!(submission.expertise.languages[0].proficiency, None);
        assert_eq!(submission.expertise.skills[0].level, None);
        let certification = &submission.certifications[0];
        assert_eq!(certification.issue_date, NaiveDate::from_ymd_opt(2020, 5, 1));
        assert_eq!(certification.verification_status, None);
    }

    #[test]
    fn test_malformed_date_still_rejected() {
        let json = serde_json::json!({
            "personalInfo": {},
            "expertise": { "experiences": [{ "startDate": "last spring" }] }
        });

        assert!(serde_json::from_value::<ExpertSubmission>(json).is_err());
    }

    #[test]
    fn test_profile_round_trips_to_submission() {
        let id = ProfileId::new();
        let submission = ExpertSubmission {
            personal_info: PersonalInfo {
                full_name: "Grace".into(),
                email: "grace@example.com".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut profile = Profile::new(id, ProfileFields::from_submission(&submission), Utc::now());
        profile.languages.push(Record::new(
            id,
            Language {
                name: "English".into(),
                proficiency: Some(Proficiency::Native),
            },
        ));

        let rebuilt = profile.to_submission();
        assert_eq!(rebuilt.personal_info, submission.personal_info);
        assert_eq!(rebuilt.expertise.languages.len(), 1);
        assert_eq!(profile.summary().email, "grace@example.com");
    }
}
