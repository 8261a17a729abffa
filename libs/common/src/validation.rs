//! Input validation utilities
//!
//! Validators return a human-readable message on failure. [`FieldErrors`]
//! collects those messages per field so handlers can report every problem
//! of a payload at once.

use chrono::{Datelike, Utc};
use regex::Regex;
use serde::Serialize;
use std::{collections::BTreeMap, sync::OnceLock};

/// Key used for problems that are not tied to a single field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Message used when a required field is absent
pub const REQUIRED: &str = "This field is required.";

/// Message used when a non-nullable field is sent as `null`
pub const NOT_NULL: &str = "This field may not be null.";

pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PERSON_NAME_MAX_LEN: usize = 150;
pub const NAME_MAX_LEN: usize = 256;
pub const SLUG_MAX_LEN: usize = 50;
pub const TEXT_MAX_LEN: usize = 200;

pub const SCORE_MIN: i64 = 1;
pub const SCORE_MAX: i64 = 10;

/// Validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding a single message for one field
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record the outcome of a validator under `field`
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    /// Record a missing required field
    pub fn require<T>(&mut self, field: &str, value: &Option<T>) {
        if value.is_none() {
            self.add(field, REQUIRED);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when nothing was recorded, the collected errors otherwise
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

fn max_length(value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!(
            "Ensure this field has no more than {max} characters."
        ));
    }
    Ok(())
}

/// Validate username: `[\w.@+-]+` in full and not `me` in any case
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("This field may not be blank.".to_string());
    }

    max_length(username, USERNAME_MAX_LEN)?;

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[\w.@+-]+\z").expect("Failed to compile username regex"));

    if !regex.is_match(username) || username.to_lowercase() == "me" {
        return Err("Invalid username.".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("This field may not be blank.".to_string());
    }

    max_length(email, EMAIL_MAX_LEN)?;

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Enter a valid email address.".to_string());
    }

    Ok(())
}

/// Validate first or last name
pub fn validate_person_name(name: &str) -> Result<(), String> {
    max_length(name, PERSON_NAME_MAX_LEN)
}

/// Validate a required display name of a category, genre or title
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    max_length(name, NAME_MAX_LEN)
}

/// Validate slug: letters, digits, underscores and hyphens only
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("This field may not be blank.".to_string());
    }

    max_length(slug, SLUG_MAX_LEN)?;

    static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = SLUG_REGEX
        .get_or_init(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("Failed to compile slug regex"));

    if !regex.is_match(slug) {
        return Err(
            "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens."
                .to_string(),
        );
    }

    Ok(())
}

/// Validate review or comment text
pub fn validate_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    max_length(text, TEXT_MAX_LEN)
}

/// Validate a release year against the current calendar year
pub fn validate_year(year: i64) -> Result<(), String> {
    validate_year_against(year, i64::from(Utc::now().year()))
}

/// Validate a release year against an explicit current year
pub fn validate_year_against(year: i64, current_year: i64) -> Result<(), String> {
    if year < 0 {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    if year > current_year {
        return Err(format!(
            "The title cannot be created in the future (year <= {current_year})."
        ));
    }
    Ok(())
}

/// Validate review score: inclusive range 1..=10
pub fn validate_score(score: i64) -> Result<(), String> {
    if score < SCORE_MIN {
        return Err(format!(
            "Ensure this value is greater than or equal to {SCORE_MIN}."
        ));
    }
    if score > SCORE_MAX {
        return Err(format!(
            "Ensure this value is less than or equal to {SCORE_MAX}."
        ));
    }
    Ok(())
}
