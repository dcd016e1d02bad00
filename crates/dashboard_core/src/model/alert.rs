//! Dashboard alerts.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes.
//! - `is_read` normally moves false -> true, but can be overridden either way.

use super::validation::{require, when_present, ValidationResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ALERT_PRIORITY: i64 = 1;

/// Persisted alert row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub title: String,
    pub message: Option<String>,
    pub priority: i64,
    pub is_read: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Insert request for one alert. New alerts always start unread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlert {
    pub title: String,
    pub message: Option<String>,
    pub priority: i64,
}

impl NewAlert {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: None,
            priority: DEFAULT_ALERT_PRIORITY,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require("title", &self.title)
    }
}

/// Partial update for an alert; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertPatch {
    pub title: Option<String>,
    pub message: Option<String>,
    pub priority: Option<i64>,
    pub is_read: Option<bool>,
}

impl AlertPatch {
    pub fn validate(&self) -> ValidationResult {
        when_present(self.title.as_deref(), |title| require("title", title))
    }
}
