//! Contact detail checks for notification recipients

use crate::error::ValidationError;

/// Basic email shape check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidFormat(format!("invalid email: {}", email));

    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

/// Strip formatting from a phone number and check it has E.164 shape.
///
/// Everything except digits and `+` is dropped. The result must be an
/// optional leading `+`, a non-zero digit, then 1 to 14 more digits.
pub fn normalize_phone(phone: &str) -> Result<String, ValidationError> {
    let cleaned: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    let well_formed = (2..=15).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');

    if well_formed {
        Ok(cleaned)
    } else {
        Err(ValidationError::InvalidFormat(format!(
            "invalid phone number: {}",
            phone
        )))
    }
}

/// Rwanda mobile number in international form: `+2507` then one of
/// 2, 3, 8, 9, then seven digits.
pub fn validate_rw_mobile(phone: &str) -> Result<(), ValidationError> {
    let well_formed = phone
        .strip_prefix("+2507")
        .and_then(|rest| rest.strip_prefix(['2', '3', '8', '9']))
        .is_some_and(|rest| rest.len() == 7 && rest.chars().all(|c| c.is_ascii_digit()));

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat(
            "phone must be in format +2507XXXXXXXX".to_string(),
        ))
    }
}
