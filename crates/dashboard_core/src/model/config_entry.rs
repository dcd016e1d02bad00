//! Key/value configuration rows.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub id: i64,
    pub config_key: String,
    pub config_value: String,
    pub description: String,
    pub updated_at: i64,
}
