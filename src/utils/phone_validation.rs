//! Phone number validation for outbound calls and SMS.
//!
//! Accepts international numbers with an optional leading `+`. Common
//! formatting characters (spaces, dashes, dots, parentheses) are stripped.
//! The remaining digits must be between [`MIN_DIGITS`] and [`MAX_DIGITS`]
//! long (E.164 allows at most 15).

use thiserror::Error;

pub const MIN_DIGITS: usize = 5;
pub const MAX_DIGITS: usize = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhoneValidationError {
    #[error("Phone number is empty")]
    Empty,

    #[error("Phone number contains invalid character '{0}'")]
    InvalidCharacter(char),

    #[error("Phone number must have between 5 and 15 digits, got {0}")]
    InvalidLength(usize),
}

/// Validate and normalize a phone number.
///
/// Returns the number with formatting removed, keeping a leading `+` if one
/// was given.
pub fn validate_phone_number(input: &str) -> Result<String, PhoneValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PhoneValidationError::Empty);
    }

    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            other => return Err(PhoneValidationError::InvalidCharacter(other)),
        }
    }

    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
        return Err(PhoneValidationError::InvalidLength(digits.len()));
    }

    Ok(if plus { format!("+{digits}") } else { digits })
}
