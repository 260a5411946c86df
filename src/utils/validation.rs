//! Validation Utilities
//!
//! Input validation for registration and credential payloads.

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

/// Checks that a field was supplied and is non-empty after trimming.
pub fn is_provided(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Validates email address format.
pub fn validate_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    regex.is_match(email)
}

/// Username policy: at least 4 characters, no whitespace.
///
/// An email address always satisfies this, which matters because the
/// username defaults to the email when none is supplied at registration.
pub fn is_valid_username(username: &str) -> bool {
    username.len() >= 4 && !username.chars().any(char::is_whitespace)
}

/// Custom validator for email fields using the validator crate.
pub fn email_validator(email: &str) -> Result<(), ValidationError> {
    if validate_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email"))
    }
}
