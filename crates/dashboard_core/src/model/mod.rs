//! Domain records for every dashboard table.
//!
//! # Responsibility
//! - Define read models (serializable rows) per table.
//! - Define insert requests and partial-update patches with their validation.
//!
//! # Invariants
//! - Tables are independent; no record references another by id.
//! - Patch fields are `Option`s: `None` means "not supplied", never "null".

pub mod alert;
pub mod config_entry;
pub mod note;
pub mod planning;
pub mod user;
pub mod validation;
pub mod warehouse;
pub mod work;
