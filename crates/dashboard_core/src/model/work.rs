//! Work items ("prace"): tracked tasks with status, deadline and progress.
//!
//! # Invariants
//! - `progress` stays within `0..=100`.
//! - `deadline` is an ISO `YYYY-MM-DD` date when present.
//! - `updated_at` is refreshed by every effective update.

use super::validation::{
    in_range, iso_date, require, when_present, ValidationError, ValidationResult,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const DEFAULT_WORK_PRIORITY: i64 = 1;
pub const MAX_PROGRESS: i64 = 100;

/// Work lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    /// Created but not started.
    #[default]
    Pending,
    InProgress,
    /// Finished; never counted as overdue.
    Completed,
}

impl WorkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl Display for WorkStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// Persisted work row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: WorkStatus,
    pub priority: i64,
    pub deadline: Option<String>,
    pub assigned_to: Option<String>,
    pub progress: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWork {
    pub title: String,
    pub description: Option<String>,
    pub status: WorkStatus,
    pub priority: i64,
    pub deadline: Option<String>,
    pub assigned_to: Option<String>,
    pub progress: i64,
}

impl NewWork {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: WorkStatus::default(),
            priority: DEFAULT_WORK_PRIORITY,
            deadline: None,
            assigned_to: None,
            progress: 0,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require("title", &self.title)?;
        in_range("progress", self.progress, 0, MAX_PROGRESS)?;
        when_present(self.deadline.as_deref(), |value| iso_date("deadline", value))
    }
}

/// Partial update for a work item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<WorkStatus>,
    pub priority: Option<i64>,
    pub deadline: Option<String>,
    pub assigned_to: Option<String>,
    pub progress: Option<i64>,
}

impl WorkPatch {
    pub fn validate(&self) -> ValidationResult {
        when_present(self.title.as_deref(), |value| require("title", value))?;
        when_present(self.progress.as_ref(), |value| {
            in_range("progress", *value, 0, MAX_PROGRESS)
        })?;
        when_present(self.deadline.as_deref(), |value| iso_date("deadline", value))
    }
}
