//! Warehouse inventory.
//!
//! # Invariants
//! - `code` is unique; the store enforces it.
//! - `quantity` never goes negative; checked here, before any write.

use super::validation::{non_negative_quantity, require, when_present, ValidationResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseItem {
    pub id: i64,
    pub name: String,
    /// Inventory code such as `MAT/ELE/00123`.
    pub code: String,
    pub quantity: i64,
    pub note: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewWarehouseItem {
    pub name: String,
    pub code: String,
    pub quantity: i64,
    pub note: String,
}

impl NewWarehouseItem {
    pub fn new(name: impl Into<String>, code: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            quantity,
            note: String::new(),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require("name", &self.name)?;
        require("code", &self.code)?;
        non_negative_quantity(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarehousePatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub quantity: Option<i64>,
    pub note: Option<String>,
}

impl WarehousePatch {
    pub fn validate(&self) -> ValidationResult {
        when_present(self.name.as_deref(), |value| require("name", value))?;
        when_present(self.code.as_deref(), |value| require("code", value))?;
        when_present(self.quantity.as_ref(), |value| non_negative_quantity(*value))
    }
}
