//! Repository layer: one SQLite-backed repository per dashboard table.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Write paths validate input before issuing SQL.
//! - "Not found" is an outcome (`Ok(None)`, [`UpdateOutcome::NotFound`],
//!   [`DeleteOutcome::NotFound`]), never an error.
//! - UNIQUE violations surface as [`RepoError::Conflict`].

use crate::db::DbError;
use crate::model::validation::ValidationError;
use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod query;

pub mod alert_repo;
pub mod config_repo;
pub mod note_repo;
pub mod planning_repo;
pub mod user_repo;
pub mod warehouse_repo;
pub mod work_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    /// Write rejected by a UNIQUE constraint; nothing was written.
    Conflict {
        table: &'static str,
        message: String,
    },
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict { table, message } => write!(f, "duplicate value in {table}: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Conflict { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The row existed and at least one field was written.
    Updated,
    /// Fields were supplied but no row has the given id.
    NotFound,
    /// No fields were supplied; the store was not touched.
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Classifies a failed write, separating UNIQUE clashes from store failures.
pub(crate) fn write_error(table: &'static str, err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::SqliteFailure(inner, message) = &err {
        if inner.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE {
            return RepoError::Conflict {
                table,
                message: message.clone().unwrap_or_else(|| inner.to_string()),
            };
        }
    }
    RepoError::from(err)
}

pub(crate) fn int_to_bool(table: &str, column: &str, value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {table}.{column}"
        ))),
    }
}

pub(crate) fn delete_by_id(
    conn: &rusqlite::Connection,
    table: &'static str,
    id: i64,
) -> RepoResult<DeleteOutcome> {
    // `table` is always a literal from the calling repository.
    let changed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1;"), [id])?;
    Ok(if changed == 0 {
        DeleteOutcome::NotFound
    } else {
        DeleteOutcome::Deleted
    })
}
