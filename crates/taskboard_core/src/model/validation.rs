//! Field validation rules for board entities and accounts.
//!
//! # Invariants
//! - Required text fields are trimmed and must be non-empty.
//! - Optional text fields collapse blank input to `None`.
//! - Emails are stored trimmed and lowercased.

use crate::model::hierarchy::EntityKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;
/// bcrypt ignores input past this many bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Local validation failure. Never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is empty after trim.
    Blank { field: &'static str },
    /// Email does not look like `local@domain.tld`.
    InvalidEmail,
    /// Password shorter than `MIN_PASSWORD_CHARS`.
    PasswordTooShort { min_chars: usize },
    /// Password longer than `MAX_PASSWORD_BYTES`.
    PasswordTooLong { max_bytes: usize },
    /// Email already belongs to another user.
    EmailTaken,
    /// Identifier text is not a UUID.
    MalformedId { kind: &'static str, value: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank { field } => write!(f, "{field} must not be blank"),
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::PasswordTooShort { min_chars } => {
                write!(f, "password must be at least {min_chars} characters")
            }
            Self::PasswordTooLong { max_bytes } => {
                write!(f, "password must be at most {max_bytes} bytes")
            }
            Self::EmailTaken => write!(f, "email address is already registered"),
            Self::MalformedId { kind, value } => write!(f, "malformed {kind} id `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Trims a required text field and rejects blank input.
pub fn normalize_required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field; blank becomes `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

pub fn normalize_email(value: &str) -> Result<String, ValidationError> {
    let normalized = value.trim().to_ascii_lowercase();
    if !EMAIL_RE.is_match(&normalized) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(normalized)
}

pub fn validate_password(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::PasswordTooShort {
            min_chars: MIN_PASSWORD_CHARS,
        });
    }
    if value.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::PasswordTooLong {
            max_bytes: MAX_PASSWORD_BYTES,
        });
    }
    Ok(())
}

/// Parses an identifier supplied by a caller.
pub fn parse_entity_id(kind: EntityKind, value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| ValidationError::MalformedId {
        kind: kind.as_str(),
        value: value.to_string(),
    })
}
