//! Typed field-path identifiers.
//!
//! A `FieldPath` names a location inside an `ExpertSubmission`: a section, an
//! optional row index for list sections and an optional field. Paths render as
//! dotted camelCase (`expertise.skills.0.name`) so form clients can attach
//! errors to inputs, and parse back from that text.

use crate::errors::ParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! field_names {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Field name as rendered in paths
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            fn parse(segment: &str) -> Option<Self> {
                match segment {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

field_names!(
    /// Fields of the personal information section
    PersonalInfoField {
        FullName => "fullName",
        Email => "email",
        Bio => "bio",
        Country => "country",
        Region => "region",
    }
);

field_names!(
    /// Scalar fields of the expertise section
    ExpertiseField {
        ExpertiseAreas => "expertiseAreas",
        YearsExperience => "yearsExperience",
    }
);

field_names!(ExperienceField {
    Role => "role",
    Organization => "organization",
    Location => "location",
    StartDate => "startDate",
    EndDate => "endDate",
    Current => "current",
    Description => "description",
    Skills => "skills",
});

field_names!(LanguageField {
    Name => "name",
    Proficiency => "proficiency",
});

field_names!(SkillField {
    Name => "name",
    Category => "category",
    Level => "level",
});

field_names!(EducationField {
    Degree => "degree",
    Field => "field",
    Institution => "institution",
    Year => "year",
});

field_names!(CertificationField {
    Title => "title",
    Issuer => "issuer",
    IssueDate => "issueDate",
    ExpiryDate => "expiryDate",
    DocumentUrl => "documentUrl",
    VerificationStatus => "verificationStatus",
});

field_names!(PublicationField {
    Title => "title",
    Journal => "journal",
    Year => "year",
    Url => "url",
});

field_names!(ReferenceField {
    Name => "name",
    Position => "position",
    Organization => "organization",
    Email => "email",
    Phone => "phone",
    Relationship => "relationship",
});

/// A row of a list section, optionally narrowed to one of its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Indexed<F> {
    pub index: usize,
    pub field: Option<F>,
}

impl<F> Indexed<F> {
    pub fn row(index: usize) -> Self {
        Self { index, field: None }
    }

    pub fn field(index: usize, field: F) -> Self {
        Self {
            index,
            field: Some(field),
        }
    }
}

/// Top-level sections of a submission, one per wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    PersonalInfo,
    Expertise,
    Education,
    Certifications,
    Publications,
    References,
}

/// Location inside a submission.
///
/// `None` at any level means "the whole subtree": `Skills(None)` is the skills
/// list itself, `Expertise(None)` covers the expertise scalars and its three
/// lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    PersonalInfo(Option<PersonalInfoField>),
    Expertise(Option<ExpertiseField>),
    Experiences(Option<Indexed<ExperienceField>>),
    Languages(Option<Indexed<LanguageField>>),
    Skills(Option<Indexed<SkillField>>),
    Education(Option<Indexed<EducationField>>),
    Certifications(Option<Indexed<CertificationField>>),
    Publications(Option<Indexed<PublicationField>>),
    References(Option<Indexed<ReferenceField>>),
}

impl FieldPath {
    pub fn personal(field: PersonalInfoField) -> Self {
        Self::PersonalInfo(Some(field))
    }

    pub fn expertise(field: ExpertiseField) -> Self {
        Self::Expertise(Some(field))
    }

    pub fn experience(index: usize, field: ExperienceField) -> Self {
        Self::Experiences(Some(Indexed::field(index, field)))
    }

    pub fn language(index: usize, field: LanguageField) -> Self {
        Self::Languages(Some(Indexed::field(index, field)))
    }

    pub fn skill(index: usize, field: SkillField) -> Self {
        Self::Skills(Some(Indexed::field(index, field)))
    }

    pub fn education(index: usize, field: EducationField) -> Self {
        Self::Education(Some(Indexed::field(index, field)))
    }

    pub fn certification(index: usize, field: CertificationField) -> Self {
        Self::Certifications(Some(Indexed::field(index, field)))
    }

    pub fn publication(index: usize, field: PublicationField) -> Self {
        Self::Publications(Some(Indexed::field(index, field)))
    }

    pub fn reference(index: usize, field: ReferenceField) -> Self {
        Self::References(Some(Indexed::field(index, field)))
    }

    /// Section this path belongs to.
    pub fn section(&self) -> Section {
        match self {
            Self::PersonalInfo(_) => Section::PersonalInfo,
            Self::Expertise(_) | Self::Experiences(_) | Self::Languages(_) | Self::Skills(_) => {
                Section::Expertise
            }
            Self::Education(_) => Section::Education,
            Self::Certifications(_) => Section::Certifications,
            Self::Publications(_) => Section::Publications,
            Self::References(_) => Section::References,
        }
    }

    /// Whether this path lies inside the subtree rooted at `root`.
    ///
    /// Every path is within itself.
    pub fn is_within(&self, root: &FieldPath) -> bool {
        use FieldPath::*;

        match (root, self) {
            (PersonalInfo(None), PersonalInfo(_)) => true,
            (PersonalInfo(Some(r)), PersonalInfo(Some(p))) => r == p,
            (Expertise(None), Expertise(_) | Experiences(_) | Languages(_) | Skills(_)) => true,
            (Expertise(Some(r)), Expertise(Some(p))) => r == p,
            (Experiences(r), Experiences(p)) => indexed_within(r, p),
            (Languages(r), Languages(p)) => indexed_within(r, p),
            (Skills(r), Skills(p)) => indexed_within(r, p),
            (Education(r), Education(p)) => indexed_within(r, p),
            (Certifications(r), Certifications(p)) => indexed_within(r, p),
            (Publications(r), Publications(p)) => indexed_within(r, p),
            (References(r), References(p)) => indexed_within(r, p),
            _ => false,
        }
    }

    /// Whether this path lies inside any of `roots`.
    pub fn is_within_any(&self, roots: &[FieldPath]) -> bool {
        roots.iter().any(|root| self.is_within(root))
    }
}

fn indexed_within<F: PartialEq>(root: &Option<Indexed<F>>, path: &Option<Indexed<F>>) -> bool {
    match (root, path) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(r), Some(p)) => r.index == p.index && (r.field.is_none() || r.field == p.field),
    }
}

fn write_indexed<F>(
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    indexed: &Option<Indexed<F>>,
    name: impl Fn(&F) -> &'static str,
) -> fmt::Result {
    f.write_str(prefix)?;
    if let Some(row) = indexed {
        write!(f, ".{}", row.index)?;
        if let Some(field) = &row.field {
            write!(f, ".{}", name(field))?;
        }
    }
    Ok(())
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PersonalInfo(None) => f.write_str("personalInfo"),
            Self::PersonalInfo(Some(field)) => write!(f, "personalInfo.{}", field.as_str()),
            Self::Expertise(None) => f.write_str("expertise"),
            Self::Expertise(Some(field)) => write!(f, "expertise.{}", field.as_str()),
            Self::Experiences(p) => write_indexed(f, "expertise.experiences", p, |x| x.as_str()),
            Self::Languages(p) => write_indexed(f, "expertise.languages", p, |x| x.as_str()),
            Self::Skills(p) => write_indexed(f, "expertise.skills", p, |x| x.as_str()),
            Self::Education(p) => write_indexed(f, "education", p, |x| x.as_str()),
            Self::Certifications(p) => write_indexed(f, "certifications", p, |x| x.as_str()),
            Self::Publications(p) => write_indexed(f, "publications", p, |x| x.as_str()),
            Self::References(p) => write_indexed(f, "references", p, |x| x.as_str()),
        }
    }
}

fn parse_indexed<F>(
    segments: &[&str],
    parse_field: impl Fn(&str) -> Option<F>,
) -> Option<Option<Indexed<F>>> {
    match segments {
        [] => Some(None),
        [index] => Some(Some(Indexed::row(index.parse().ok()?))),
        [index, field] => Some(Some(Indexed::field(
            index.parse().ok()?,
            parse_field(field)?,
        ))),
        _ => None,
    }
}

impl FromStr for FieldPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('.').collect();

        let parsed = match segments.as_slice() {
            ["personalInfo"] => Some(Self::PersonalInfo(None)),
            ["personalInfo", field] => PersonalInfoField::parse(field).map(Self::personal),
            ["expertise"] => Some(Self::Expertise(None)),
            ["expertise", "experiences", rest @ ..] => {
                parse_indexed(rest, ExperienceField::parse).map(Self::Experiences)
            }
            ["expertise", "languages", rest @ ..] => {
                parse_indexed(rest, LanguageField::parse).map(Self::Languages)
            }
            ["expertise", "skills", rest @ ..] => {
                parse_indexed(rest, SkillField::parse).map(Self::Skills)
            }
            ["expertise", field] => ExpertiseField::parse(field).map(Self::expertise),
            ["education", rest @ ..] => {
                parse_indexed(rest, EducationField::parse).map(Self::Education)
            }
            ["certifications", rest @ ..] => {
                parse_indexed(rest, CertificationField::parse).map(Self::Certifications)
            }
            ["publications", rest @ ..] => {
                parse_indexed(rest, PublicationField::parse).map(Self::Publications)
            }
            ["references", rest @ ..] => {
                parse_indexed(rest, ReferenceField::parse).map(Self::References)
            }
            _ => None,
        };

        parsed.ok_or_else(|| ParseError::FieldPath(s.to_string()))
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested_paths() {
        assert_eq!(
            FieldPath::skill(0, SkillField::Name).to_string(),
            "expertise.skills.0.name"
        );
        assert_eq!(FieldPath::References(None).to_string(), "references");
        assert_eq!(
            FieldPath::Certifications(Some(Indexed::row(2))).to_string(),
            "certifications.2"
        );
        assert_eq!(
            FieldPath::personal(PersonalInfoField::FullName).to_string(),
            "personalInfo.fullName"
        );
    }

    #[test]
    fn test_parse_matches_render() {
        let paths = [
            FieldPath::PersonalInfo(None),
            FieldPath::expertise(ExpertiseField::YearsExperience),
            FieldPath::Experiences(None),
            FieldPath::experience(3, ExperienceField::EndDate),
            FieldPath::reference(1, ReferenceField::Phone),
            FieldPath::Education(Some(Indexed::row(0))),
        ];
        for path in paths {
            assert_eq!(path.to_string().parse::<FieldPath>().unwrap(), path);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_segments() {
        assert!("expertise.skills.x.name".parse::<FieldPath>().is_err());
        assert!("references.0.fax".parse::<FieldPath>().is_err());
        assert!("hobbies".parse::<FieldPath>().is_err());
        assert!("education.0.degree.extra".parse::<FieldPath>().is_err());
    }

    #[test]
    fn test_expertise_root_covers_lists() {
        let root = FieldPath::Expertise(None);
        assert!(FieldPath::skill(4, SkillField::Level).is_within(&root));
        assert!(FieldPath::Languages(None).is_within(&root));
        assert!(!FieldPath::Education(None).is_within(&root));
    }

    #[test]
    fn test_row_root_selects_single_row() {
        let root = FieldPath::References(Some(Indexed::row(1)));
        assert!(FieldPath::reference(1, ReferenceField::Email).is_within(&root));
        assert!(!FieldPath::reference(0, ReferenceField::Email).is_within(&root));
        assert!(!FieldPath::References(None).is_within(&root));
    }

    #[test]
    fn test_section_of_list_paths() {
        assert_eq!(FieldPath::Skills(None).section(), Section::Expertise);
        assert_eq!(
            FieldPath::publication(0, PublicationField::Url).section(),
            Section::Publications
        );
    }

    #[test]
    fn test_serde_as_string() {
        let path = FieldPath::language(0, LanguageField::Proficiency);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"expertise.languages.0.proficiency\"");
        let back: FieldPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
