//! Input validation for emission and template requests.
//!
//! Errors are collected per field so a form can highlight every problem at
//! once instead of failing on the first.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Longest accepted training date string.
pub const MAX_DATE_LENGTH: usize = 32;

/// Trait for validating request objects.
pub trait Validator {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Validation error with a field path and a user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationError {
    /// The field that failed validation, e.g. `context.employee.full_name`
    pub field: String,
    pub message: String,
    /// Suggestion for how to fix the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create error for empty required field
    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} must not be empty", label))
            .with_suggestion(format!("Provide a value for {}", label.to_lowercase()))
    }

    pub fn missing(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} is required", label))
    }

    pub fn date_too_long(field: &str, value: &str) -> Self {
        Self::new(
            field,
            format!(
                "Date '{}' is longer than {} characters",
                value, MAX_DATE_LENGTH
            ),
        )
        .with_suggestion("Use the YYYY-MM-DD format, e.g. 2025-01-10")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// One line per error, numbered.
    pub fn to_message(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Validation failed: {} error(s) found",
            self.errors.len()
        )];
        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }
        parts.join("\n")
    }

    /// Ok if no errors were collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_message())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// Validate every non-blank training date against [`MAX_DATE_LENGTH`].
pub fn validate_training_dates(dates: &[String], field: &str, errors: &mut ValidationErrors) {
    for (i, date) in dates.iter().enumerate() {
        let trimmed = date.trim();
        if trimmed.chars().count() > MAX_DATE_LENGTH {
            errors.add(ValidationError::date_too_long(
                &format!("{}[{}]", field, i),
                trimmed,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_field() {
        let mut errors = ValidationErrors::new();
        validate_required("   ", "name", "Name", &mut errors);
        validate_required("ok", "other", "Other", &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "name");
        assert_eq!(errors.errors()[0].message, "Name must not be empty");
    }

    #[test]
    fn test_training_dates_length() {
        let mut errors = ValidationErrors::new();
        let dates = vec![
            "2025-01-10".to_string(),
            "".to_string(),
            "x".repeat(MAX_DATE_LENGTH + 1),
        ];
        validate_training_dates(&dates, "context.training_dates", &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "context.training_dates[2]");
    }

    #[test]
    fn test_message_format() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::missing("context.signer", "Signer"));
        let message = errors.to_message();
        assert!(message.starts_with("Validation failed: 1 error(s) found"));
        assert!(message.contains("1. [context.signer] Signer is required"));
        assert!(errors.clone().into_result().is_err());
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
