//! Test fixtures for generating registration data.
//!
//! Every fixture here passes the full schema validator unless its name says
//! otherwise.

use chrono::NaiveDate;
use fake::{
    faker::{
        address::en::CountryName,
        company::en::CompanyName,
        internet::en::Username,
        job::en::Title,
        lorem::en::{Sentence, Words},
        name::en::Name,
    },
    Fake,
};
use expert_roster_domain::{
    Certification, Education, ExpertSubmission, Experience, Expertise, Language, PersonalInfo,
    Proficiency, Publication, Reference, Skill, SkillLevel, EXPERTISE_AREAS, SKILL_CATEGORIES,
};
use uuid::Uuid;

/// Bio text of exactly `chars` characters
pub fn bio_of_length(chars: usize) -> String {
    let mut bio = String::with_capacity(chars);
    while bio.chars().count() < chars {
        let sentence: String = Sentence(6..12).fake();
        bio.push_str(&sentence);
        bio.push(' ');
    }
    bio.chars().take(chars).collect()
}

/// Email address that will not collide with other fixtures
pub fn unique_email() -> String {
    let user: String = Username().fake();
    format!(
        "{}.{}@example.org",
        user.to_lowercase(),
        &Uuid::new_v4().simple().to_string()[..8]
    )
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// A professional reference with every field filled in
pub fn reference() -> Reference {
    Reference {
        name: Name().fake(),
        position: Title().fake(),
        organization: CompanyName().fake(),
        email: unique_email(),
        phone: "+1 555 010 0199".to_string(),
        relationship: "Former manager".to_string(),
    }
}

pub fn skill(name: &str, level: SkillLevel) -> Skill {
    Skill {
        name: name.to_string(),
        category: SKILL_CATEGORIES[0].to_string(),
        level: Some(level),
        endorsements: 0,
    }
}

pub fn language(name: &str, proficiency: Proficiency) -> Language {
    Language {
        name: name.to_string(),
        proficiency: Some(proficiency),
    }
}

/// Ongoing position with no end date
pub fn current_experience() -> Experience {
    let words: Vec<String> = Words(2..4).fake();
    Experience {
        role: Title().fake(),
        organization: CompanyName().fake(),
        location: Some(CountryName().fake()),
        start_date: Some(date(2018, 3, 1)),
        end_date: None,
        current: true,
        description: Some(Sentence(5..10).fake()),
        skills: words.into_iter().collect(),
    }
}

pub fn education() -> Education {
    Education {
        degree: "MSc".to_string(),
        field: "Epidemiology".to_string(),
        institution: format!("{} University", Name().fake::<String>()),
        year: "2015".to_string(),
    }
}

/// Certification without a verification status, as the form submits it
pub fn certification() -> Certification {
    Certification {
        title: "Project Management Professional".to_string(),
        issuer: "PMI".to_string(),
        issue_date: Some(date(2020, 6, 15)),
        expiry_date: Some(date(2026, 6, 15)),
        document_url: None,
        verification_status: None,
    }
}

pub fn publication() -> Publication {
    Publication {
        title: Sentence(4..8).fake(),
        journal: "The Lancet".to_string(),
        year: "2021".to_string(),
        url: None,
    }
}

/// Complete submission with randomized but valid contents
pub fn valid_submission() -> ExpertSubmission {
    let bio_chars = (120..480).fake::<usize>();

    ExpertSubmission {
        personal_info: PersonalInfo {
            full_name: Name().fake(),
            email: unique_email(),
            bio: bio_of_length(bio_chars),
            country: Some(CountryName().fake()),
            region: None,
        },
        expertise: Expertise {
            expertise_areas: [EXPERTISE_AREAS[0].to_string()].into_iter().collect(),
            years_experience: (0..40).fake(),
            experiences: vec![current_experience()],
            languages: vec![language("English", Proficiency::Native)],
            skills: vec![skill("Data analysis", SkillLevel::Advanced)],
        },
        education: vec![education()],
        certifications: vec![certification()],
        publications: vec![publication()],
        references: vec![reference(), reference()],
    }
}

/// The minimal registration walked through end to end: one skill, one
/// language, one current job, one degree and two references
pub fn concrete_scenario_submission() -> ExpertSubmission {
    ExpertSubmission {
        personal_info: PersonalInfo {
            full_name: "Ab".to_string(),
            email: "a@b.com".to_string(),
            bio: bio_of_length(100),
            country: None,
            region: None,
        },
        expertise: Expertise {
            expertise_areas: ["Public Health".to_string()].into_iter().collect(),
            years_experience: 5,
            experiences: vec![Experience {
                role: "Analyst".to_string(),
                organization: "WHO".to_string(),
                start_date: Some(date(2019, 1, 1)),
                current: true,
                ..Default::default()
            }],
            languages: vec![language("English", Proficiency::Native)],
            skills: vec![Skill {
                name: "X".to_string(),
                category: "Technical".to_string(),
                level: Some(SkillLevel::Expert),
                endorsements: 0,
            }],
        },
        education: vec![Education {
            degree: "BSc".to_string(),
            field: "Biology".to_string(),
            institution: "State University".to_string(),
            year: "2012".to_string(),
        }],
        certifications: Vec::new(),
        publications: Vec::new(),
        references: vec![reference(), reference()],
    }
}
