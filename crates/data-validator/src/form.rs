//! Required-field and password checks for account and content forms

use crate::error::ValidationError;

/// Trimmed value of a required text field
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

/// Minimum password length check
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), ValidationError> {
    if password.chars().count() < min_length {
        return Err(ValidationError::InvalidFormat(format!(
            "password must be at least {} characters long",
            min_length
        )));
    }
    Ok(())
}
