//! Field-level validation errors.
//!
//! `FieldErrors` maps a typed field path to the human-readable messages for
//! that field. Entries are kept in path order so rendering is stable.

use crate::field_path::FieldPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Validation failures keyed by field path.
///
/// Serializes as a JSON object: `{"expertise.skills.0.name": ["Skill name is required"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FieldPath, Vec<String>>);

impl FieldErrors {
    /// Create an empty error set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, path: FieldPath, message: impl Into<String>) {
        self.0.entry(path).or_default().push(message.into());
    }

    /// Keep only errors located inside one of `roots`
    pub fn retain_within(&mut self, roots: &[FieldPath]) {
        self.0.retain(|path, _| path.is_within_any(roots));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one error
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.0.contains_key(path)
    }

    /// Messages recorded for a field
    pub fn get(&self, path: &FieldPath) -> Option<&[String]> {
        self.0.get(path).map(Vec::as_slice)
    }

    /// First message recorded for a field
    pub fn first(&self, path: &FieldPath) -> Option<&str> {
        self.get(path).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &[String])> {
        self.0.iter().map(|(path, messages)| (path, messages.as_slice()))
    }

    /// `Ok(())` when empty, otherwise the errors themselves
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", path, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_path::{ReferenceField, SkillField};

    #[test]
    fn test_add_accumulates_per_path() {
        let mut errors = FieldErrors::new();
        errors.add(FieldPath::skill(0, SkillField::Name), "Skill name is required");
        errors.add(FieldPath::skill(0, SkillField::Name), "second");
        errors.add(FieldPath::References(None), "At least two references are required");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(&FieldPath::skill(0, SkillField::Name)).map(|m| m.len()), Some(2));
        assert_eq!(
            errors.first(&FieldPath::References(None)),
            Some("At least two references are required")
        );
    }

    #[test]
    fn test_retain_within_roots() {
        let mut errors = FieldErrors::new();
        errors.add(FieldPath::skill(1, SkillField::Level), "Skill level is required");
        errors.add(FieldPath::reference(0, ReferenceField::Phone), "too short");

        errors.retain_within(&[FieldPath::References(None)]);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(&FieldPath::reference(0, ReferenceField::Phone)));
    }

    #[test]
    fn test_serializes_as_path_keyed_object() {
        let mut errors = FieldErrors::new();
        errors.add(FieldPath::skill(0, SkillField::Name), "Skill name is required");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "expertise.skills.0.name": ["Skill name is required"] })
        );
    }

    #[test]
    fn test_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());
        let mut errors = FieldErrors::new();
        errors.add(FieldPath::Education(None), "Add at least one education entry");
        assert_eq!(
            errors.into_result().unwrap_err().to_string(),
            "education: Add at least one education entry"
        );
    }
}
