//! Validation Framework
//!
//! Schema rules for expert submissions. Every check records its failure
//! against a typed [`FieldPath`] so callers can render errors next to the
//! offending input, including individual rows of list sections.

mod profile;

pub use profile::*;

use expert_roster_domain::{FieldErrors, FieldPath};

/// Trait for validatable types
pub trait Validatable {
    /// Validate the value and return every failure found
    fn validate_all(&self) -> FieldErrors;
}

/// Common validation rules
pub struct ValidationRules;

impl ValidationRules {
    /// Record `message` when a text field is empty
    pub fn required(errors: &mut FieldErrors, path: FieldPath, value: &str, message: &str) {
        if value.is_empty() {
            errors.add(path, message);
        }
    }

    /// Record `message` when an optional field has no value
    pub fn required_value<T>(
        errors: &mut FieldErrors,
        path: FieldPath,
        value: &Option<T>,
        message: &str,
    ) {
        if value.is_none() {
            errors.add(path, message);
        }
    }

    /// Record `message` when a text field has fewer than `min` characters.
    ///
    /// Length is counted in characters, not bytes.
    pub fn min_chars(
        errors: &mut FieldErrors,
        path: FieldPath,
        value: &str,
        min: usize,
        message: &str,
    ) -> bool {
        if value.chars().count() < min {
            errors.add(path, message);
            return false;
        }
        true
    }

    /// Record `message` when a text field has more than `max` characters
    pub fn max_chars(
        errors: &mut FieldErrors,
        path: FieldPath,
        value: &str,
        max: usize,
        message: &str,
    ) -> bool {
        if value.chars().count() > max {
            errors.add(path, message);
            return false;
        }
        true
    }

    /// Record an invalid-address message unless `value` is a syntactically
    /// valid email address
    pub fn email(errors: &mut FieldErrors, path: FieldPath, value: &str) {
        if !validator::validate_email(value) {
            errors.add(path, messages::INVALID_EMAIL);
        }
    }

    /// Record `message` against the list path when it holds fewer than `min` rows
    pub fn min_items(
        errors: &mut FieldErrors,
        path: FieldPath,
        len: usize,
        min: usize,
        message: &str,
    ) {
        if len < min {
            errors.add(path, message);
        }
    }
}
