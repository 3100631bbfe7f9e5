//! Field-level input validation shared by account/member/location inputs.
//!
//! # Responsibility
//! - Report the first offending field as a structured error.
//! - Keep text rules (blank, length, format) in one place.
//!
//! # Invariants
//! - Validation is pure: it never touches storage.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static LOCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$").expect("valid locale regex"));
static POSTAL_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,8}[A-Za-z0-9]$").expect("valid postal regex")
});

/// Structured input validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValidationError {
    /// Required identifier is the nil UUID.
    NilId { field: &'static str },
    /// Required text is empty after trim.
    Blank { field: &'static str },
    /// Text exceeds the maximum number of characters.
    TooLong { field: &'static str, max: usize },
    /// Value does not match the expected format.
    InvalidFormat { field: &'static str },
    /// Amount must be zero or positive.
    NegativeAmount { field: &'static str },
    /// A value is required because another field is set.
    Missing {
        field: &'static str,
        required_by: &'static str,
    },
    /// `end` must come after `start`.
    InvalidRange {
        start: &'static str,
        end: &'static str,
    },
}

impl InputValidationError {
    /// Name of the offending input field (camelCase, as seen by callers).
    pub fn field(&self) -> &'static str {
        match self {
            Self::NilId { field }
            | Self::Blank { field }
            | Self::TooLong { field, .. }
            | Self::InvalidFormat { field }
            | Self::NegativeAmount { field }
            | Self::Missing { field, .. } => field,
            Self::InvalidRange { end, .. } => end,
        }
    }
}

impl Display for InputValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId { field } => write!(f, "`{field}` must not be empty"),
            Self::Blank { field } => write!(f, "`{field}` must not be blank"),
            Self::TooLong { field, max } => {
                write!(f, "`{field}` must be at most {max} characters")
            }
            Self::InvalidFormat { field } => write!(f, "`{field}` has an invalid format"),
            Self::NegativeAmount { field } => write!(f, "`{field}` must not be negative"),
            Self::Missing { field, required_by } => {
                write!(f, "`{field}` is required when `{required_by}` is set")
            }
            Self::InvalidRange { start, end } => {
                write!(f, "`{end}` must be later than `{start}`")
            }
        }
    }
}

impl Error for InputValidationError {}

pub type ValidationResult = Result<(), InputValidationError>;

pub(crate) fn require_text(field: &'static str, value: &str, max: usize) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(InputValidationError::Blank { field });
    }
    if value.chars().count() > max {
        return Err(InputValidationError::TooLong { field, max });
    }
    Ok(())
}

pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult {
    match value {
        Some(value) => require_text(field, value, max),
        None => Ok(()),
    }
}

pub(crate) fn optional_locale(value: Option<&str>) -> ValidationResult {
    match value {
        Some(value) if !LOCALE_RE.is_match(value) => {
            Err(InputValidationError::InvalidFormat { field: "locale" })
        }
        _ => Ok(()),
    }
}

pub(crate) fn optional_postal_code(value: Option<&str>) -> ValidationResult {
    match value {
        Some(value) if !POSTAL_CODE_RE.is_match(value) => {
            Err(InputValidationError::InvalidFormat {
                field: "postalCode",
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{optional_locale, optional_postal_code, require_text, InputValidationError};

    #[test]
    fn require_text_rejects_whitespace_only() {
        let err = require_text("firstName", "  \t", 10).unwrap_err();
        assert_eq!(err, InputValidationError::Blank { field: "firstName" });
    }

    #[test]
    fn require_text_counts_characters_not_bytes() {
        assert!(require_text("city", "Zürich", 6).is_ok());
        let err = require_text("city", "Zürich!", 6).unwrap_err();
        assert_eq!(err.field(), "city");
    }

    #[test]
    fn locale_accepts_language_and_region_forms() {
        assert!(optional_locale(Some("en")).is_ok());
        assert!(optional_locale(Some("en-US")).is_ok());
        assert!(optional_locale(None).is_ok());
        assert!(optional_locale(Some("english")).is_err());
        assert!(optional_locale(Some("en_us")).is_err());
    }

    #[test]
    fn postal_code_allows_inner_spaces_and_dashes() {
        assert!(optional_postal_code(Some("SW1A 1AA")).is_ok());
        assert!(optional_postal_code(Some("12345-6789")).is_ok());
        assert!(optional_postal_code(Some("1")).is_err());
        assert!(optional_postal_code(Some(" 1234")).is_err());
    }
}
