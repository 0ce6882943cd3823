//! Child relations of a profile.
//!
//! Every child collection is owned by exactly one profile and is replaced as
//! a whole on edit. `ChildRows` carries one relation's replacement rows.

use crate::errors::ParseError;
use crate::field_path::FieldPath;
use crate::profile::{
    Certification, Education, ExpertSubmission, Experience, Language, Publication, Reference,
    Skill, VerificationStatus,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the seven one-to-many collections owned by a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Skills,
    Languages,
    Experiences,
    Education,
    Certifications,
    Publications,
    References,
}

impl Relation {
    /// All relations in the order they are written
    pub const ALL: [Relation; 7] = [
        Relation::Skills,
        Relation::Languages,
        Relation::Experiences,
        Relation::Education,
        Relation::Certifications,
        Relation::Publications,
        Relation::References,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skills => "skills",
            Self::Languages => "languages",
            Self::Experiences => "experiences",
            Self::Education => "education",
            Self::Certifications => "certifications",
            Self::Publications => "publications",
            Self::References => "references",
        }
    }

    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            Self::Skills => "profile_skills",
            Self::Languages => "profile_languages",
            Self::Experiences => "profile_experiences",
            Self::Education => "profile_education",
            Self::Certifications => "profile_certifications",
            Self::Publications => "profile_publications",
            Self::References => "profile_references",
        }
    }

    /// Minimum number of rows a valid profile carries
    pub fn min_rows(&self) -> usize {
        match self {
            Self::Skills | Self::Languages | Self::Experiences | Self::Education => 1,
            Self::Certifications | Self::Publications => 0,
            Self::References => 2,
        }
    }

    /// Field path of the whole collection
    pub fn path(&self) -> FieldPath {
        match self {
            Self::Skills => FieldPath::Skills(None),
            Self::Languages => FieldPath::Languages(None),
            Self::Experiences => FieldPath::Experiences(None),
            Self::Education => FieldPath::Education(None),
            Self::Certifications => FieldPath::Certifications(None),
            Self::Publications => FieldPath::Publications(None),
            Self::References => FieldPath::References(None),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relation::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseError::unknown("relation", s))
    }
}

/// Replacement rows for a single relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "relation", content = "rows", rename_all = "lowercase")]
pub enum ChildRows {
    Skills(Vec<Skill>),
    Languages(Vec<Language>),
    Experiences(Vec<Experience>),
    Education(Vec<Education>),
    Certifications(Vec<Certification>),
    Publications(Vec<Publication>),
    References(Vec<Reference>),
}

impl ChildRows {
    pub fn relation(&self) -> Relation {
        match self {
            Self::Skills(_) => Relation::Skills,
            Self::Languages(_) => Relation::Languages,
            Self::Experiences(_) => Relation::Experiences,
            Self::Education(_) => Relation::Education,
            Self::Certifications(_) => Relation::Certifications,
            Self::Publications(_) => Relation::Publications,
            Self::References(_) => Relation::References,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Skills(rows) => rows.len(),
            Self::Languages(rows) => rows.len(),
            Self::Experiences(rows) => rows.len(),
            Self::Education(rows) => rows.len(),
            Self::Certifications(rows) => rows.len(),
            Self::Publications(rows) => rows.len(),
            Self::References(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode a JSON array of rows for the given relation.
    pub fn from_json(
        relation: Relation,
        rows: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match relation {
            Relation::Skills => Self::Skills(serde_json::from_value(rows)?),
            Relation::Languages => Self::Languages(serde_json::from_value(rows)?),
            Relation::Experiences => Self::Experiences(serde_json::from_value(rows)?),
            Relation::Education => Self::Education(serde_json::from_value(rows)?),
            Relation::Certifications => Self::Certifications(serde_json::from_value(rows)?),
            Relation::Publications => Self::Publications(serde_json::from_value(rows)?),
            Relation::References => Self::References(serde_json::from_value(rows)?),
        })
    }

    /// Split a submission into its seven child collections.
    pub fn all_from_submission(submission: &ExpertSubmission) -> Vec<ChildRows> {
        let expertise = &submission.expertise;
        vec![
            Self::Skills(expertise.skills.clone()),
            Self::Languages(expertise.languages.clone()),
            Self::Experiences(expertise.experiences.clone()),
            Self::Education(submission.education.clone()),
            Self::Certifications(submission.certifications.clone()),
            Self::Publications(submission.publications.clone()),
            Self::References(submission.references.clone()),
        ]
    }

    /// Apply system-assigned values before rows are written: skills start
    /// with no endorsements and certifications default to `Pending`.
    pub fn normalized(self) -> Self {
        match self {
            Self::Skills(rows) => Self::Skills(
                rows.into_iter()
                    .map(|skill| Skill {
                        endorsements: 0,
                        ..skill
                    })
                    .collect(),
            ),
            Self::Certifications(rows) => Self::Certifications(
                rows.into_iter()
                    .map(|cert| Certification {
                        verification_status: Some(
                            cert.verification_status.unwrap_or(VerificationStatus::Pending),
                        ),
                        ..cert
                    })
                    .collect(),
            ),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SkillLevel;

    #[test]
    fn test_relation_names_round_trip() {
        for relation in Relation::ALL {
            assert_eq!(relation.as_str().parse::<Relation>().unwrap(), relation);
        }
        assert!("documents".parse::<Relation>().is_err());
    }

    #[test]
    fn test_normalized_forces_system_values() {
        let skills = ChildRows::Skills(vec![Skill {
            name: "X".into(),
            category: "Technical".into(),
            level: Some(SkillLevel::Expert),
            endorsements: 42,
        }])
        .normalized();
        match skills {
            ChildRows::Skills(rows) => assert_eq!(rows[0].endorsements, 0),
            other => panic!("unexpected rows: {:?}", other),
        }

        let certs = ChildRows::Certifications(vec![Certification {
            title: "PMP".into(),
            ..Default::default()
        }])
        .normalized();
        match certs {
            ChildRows::Certifications(rows) => {
                assert_eq!(rows[0].verification_status, Some(VerificationStatus::Pending))
            }
            other => panic!("unexpected rows: {:?}", other),
        }
    }

    #[test]
    fn test_from_json_uses_relation() {
        let rows = serde_json::json!([{ "name": "French", "proficiency": "Advanced" }]);
        let parsed = ChildRows::from_json(Relation::Languages, rows).unwrap();
        assert_eq!(parsed.relation(), Relation::Languages);
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_all_from_submission_covers_every_relation() {
        let rows = ChildRows::all_from_submission(&ExpertSubmission::default());
        let relations: Vec<Relation> = rows.iter().map(ChildRows::relation).collect();
        assert_eq!(relations, Relation::ALL.to_vec());
    }
}
