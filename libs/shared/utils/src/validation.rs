use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("static regex"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex")
});

/// Accumulated field errors, reported together in one 400 response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<String>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Default)]
pub struct FieldValidator {
    errors: Vec<String>,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(format!("{} is required", field));
        }
        self
    }

    pub fn max_length(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.errors.push(format!("{} cannot exceed {} characters", field, max));
        }
        self
    }

    pub fn min_length(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.errors.push(format!("{} must be at least {} characters long", field, min));
        }
        self
    }

    /// Skips empty values, `required` reports those.
    pub fn digits(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !DIGITS.is_match(value) {
            self.errors.push(format!("{} must contain only numbers", field));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !EMAIL.is_match(value) {
            self.errors.push(format!("{} must be a valid email address", field));
        }
        self
    }

    /// Required, bounded text field.
    pub fn text(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        self.required(field, value).max_length(field, value, max)
    }

    /// Validates an optional field only when present.
    pub fn optional<F>(&mut self, value: Option<&str>, check: F) -> &mut Self
    where F: FnOnce(&mut Self, &str) {
        if let Some(value) = value {
            check(self, value);
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(std::mem::take(&mut self.errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_failure() {
        let err = FieldValidator::new()
            .text("First name", "", 90)
            .digits("Identification", "12a")
            .email("Email", "not-an-email")
            .finish()
            .unwrap_err();

        assert_eq!(err.0.len(), 3);
        assert!(err.to_string().contains("First name is required"));
        assert!(err.to_string().contains("Identification must contain only numbers"));
    }

    #[test]
    fn accepts_valid_input() {
        assert!(FieldValidator::new()
            .text("First name", "Ana", 90)
            .digits("Identification", "9876543210")
            .email("Email", "ana.martinez@hospital.com")
            .min_length("Password", "secret1", 6)
            .finish()
            .is_ok());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let name = "Martínez";
        assert!(FieldValidator::new().max_length("Last name", name, 8).finish().is_ok());
    }

    #[test]
    fn optional_fields_are_checked_only_when_present() {
        assert!(FieldValidator::new()
            .optional(None, |v, value| { v.email("Email", value); })
            .finish()
            .is_ok());
        assert!(FieldValidator::new()
            .optional(Some("bad"), |v, value| { v.email("Email", value); })
            .finish()
            .is_err());
    }
}
