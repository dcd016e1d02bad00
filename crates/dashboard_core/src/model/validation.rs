//! Input validation shared by all write paths.
//!
//! # Invariants
//! - Validation runs before any SQL is issued; a failed check leaves the
//!   store untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid date regex")
});
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Rejected input, detected before touching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is missing or blank.
    MissingField(&'static str),
    TooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
    /// Warehouse quantities can never go below zero.
    NegativeQuantity(i64),
    /// Expected `YYYY-MM-DD`.
    InvalidDate {
        field: &'static str,
        value: String,
    },
    InvalidEmail(String),
    UnknownStatus(String),
    /// Requested sort column is not in the entity's allow-list.
    UnknownSortColumn {
        entity: &'static str,
        column: String,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "`{field}` is required"),
            Self::TooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "`{field}` is too long: {actual_chars} chars, max {max_chars}"
            ),
            Self::OutOfRange {
                field,
                min,
                max,
                value,
            } => write!(f, "`{field}` must be within {min}..={max}, got {value}"),
            Self::NegativeQuantity(value) => {
                write!(f, "quantity must not be negative, got {value}")
            }
            Self::InvalidDate { field, value } => {
                write!(f, "`{field}` must be a YYYY-MM-DD date, got `{value}`")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::UnknownStatus(value) => write!(f, "unknown work status `{value}`"),
            Self::UnknownSortColumn { entity, column } => {
                write!(f, "cannot sort {entity} by `{column}`")
            }
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub(crate) fn require(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

pub(crate) fn max_chars(field: &'static str, value: &str, max: usize) -> ValidationResult {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field,
            max_chars: max,
            actual_chars: actual,
        });
    }
    Ok(())
}

pub(crate) fn in_range(field: &'static str, value: i64, min: i64, max: i64) -> ValidationResult {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

pub(crate) fn non_negative_quantity(value: i64) -> ValidationResult {
    if value < 0 {
        return Err(ValidationError::NegativeQuantity(value));
    }
    Ok(())
}

pub(crate) fn iso_date(field: &'static str, value: &str) -> ValidationResult {
    if !ISO_DATE_RE.is_match(value) {
        return Err(ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn email(value: &str) -> ValidationResult {
    require("email", value)?;
    if !EMAIL_RE.is_match(value.trim()) {
        return Err(ValidationError::InvalidEmail(value.to_string()));
    }
    Ok(())
}

/// Runs `check` on `value` only when it is present.
pub(crate) fn when_present<T: ?Sized>(
    value: Option<&T>,
    check: impl FnOnce(&T) -> ValidationResult,
) -> ValidationResult {
    match value {
        Some(value) => check(value),
        None => Ok(()),
    }
}
