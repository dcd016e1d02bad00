//! Planning board items.

use super::validation::{require, when_present, ValidationResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningItem {
    pub id: i64,
    pub name: String,
    pub text: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPlanningItem {
    pub name: String,
    pub text: String,
}

impl NewPlanningItem {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanningPatch {
    pub name: Option<String>,
    pub text: Option<String>,
}

impl PlanningPatch {
    pub fn validate(&self) -> ValidationResult {
        when_present(self.name.as_deref(), |name| require("name", name))
    }
}
