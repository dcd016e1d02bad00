//! Notes with optional alert/planning flags.

use super::validation::{max_chars, require, when_present, ValidationResult};
use serde::{Deserialize, Serialize};

pub const NOTE_NAME_MAX_CHARS: usize = 255;

/// Persisted note row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub name: String,
    pub text: String,
    pub is_alert: bool,
    pub is_planing: bool,
    /// Free-form time label shown by the front-end, e.g. `09:00`.
    pub alert_time: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNote {
    pub name: String,
    pub text: String,
    pub is_alert: bool,
    pub is_planing: bool,
    pub alert_time: String,
}

impl NewNote {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ValidationResult {
        validate_name(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub name: Option<String>,
    pub text: Option<String>,
    pub is_alert: Option<bool>,
    pub is_planing: Option<bool>,
    pub alert_time: Option<String>,
}

impl NotePatch {
    pub fn validate(&self) -> ValidationResult {
        when_present(self.name.as_deref(), validate_name)
    }
}

fn validate_name(name: &str) -> ValidationResult {
    require("name", name)?;
    max_chars("name", name, NOTE_NAME_MAX_CHARS)
}
