use std::sync::LazyLock;

use regex::Regex;

use super::error::{ApiError, FieldError};

static CONFIG_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Collects field errors during a validation pass and reports them all at
/// once instead of stopping at the first miss.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn require(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Some(v.to_string()),
            None => {
                self.fail(field, format!("{field} is required"));
                None
            }
        }
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.len() > max {
            self.fail(field, format!("{field} must be at most {max} characters"));
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !EMAIL_RE.is_match(value) {
            self.fail(field, "Invalid email address");
        }
    }

    pub fn config_key(&mut self, field: &str, value: &str) {
        if value.is_empty() || value.len() > 50 || !CONFIG_KEY_RE.is_match(value) {
            self.fail(
                field,
                "Key must be 1-50 lowercase letters, digits, or underscores",
            );
        }
    }

    pub fn non_negative(&mut self, field: &str, value: f64) {
        if value < 0.0 {
            self.fail(field, format!("{field} must not be negative"));
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

pub fn validate_password(v: &mut Validator, password: Option<&str>) -> Option<String> {
    let password = v.require("password", password)?;
    if password.len() < 6 {
        v.fail("password", "Password must be at least 6 characters");
        return None;
    }
    Some(password)
}
