//! Key/value configuration repository.
//!
//! # Invariants
//! - At most one row per `config_key`.
//! - Setting an existing key keeps its `id` and `description` and refreshes
//!   `updated_at`.

use super::query::touch_assignment;
use super::{write_error, RepoResult};
use crate::model::config_entry::ConfigEntry;
use crate::model::validation::require;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;

pub trait ConfigRepository {
    fn get_config(&self, key: &str) -> RepoResult<Option<String>>;
    fn get_all_config(&self) -> RepoResult<BTreeMap<String, String>>;
    fn list_entries(&self) -> RepoResult<Vec<ConfigEntry>>;
    /// Inserts `key` or overwrites its value.
    fn set_config(&self, key: &str, value: &str) -> RepoResult<()>;
}

pub struct SqliteConfigRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteConfigRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ConfigRepository for SqliteConfigRepository<'_> {
    fn get_config(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT config_value FROM config WHERE config_key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn get_all_config(&self) -> RepoResult<BTreeMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT config_key, config_value FROM config;")?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<BTreeMap<String, String>, _>>()?;
        Ok(pairs)
    }

    fn list_entries(&self) -> RepoResult<Vec<ConfigEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, config_key, config_value, description, updated_at
             FROM config
             ORDER BY config_key ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn set_config(&self, key: &str, value: &str) -> RepoResult<()> {
        require("config_key", key)?;

        self.conn
            .execute(
                &format!(
                    "INSERT INTO config (config_key, config_value) VALUES (?1, ?2)
                     ON CONFLICT(config_key) DO UPDATE SET
                        config_value = excluded.config_value,
                        {};",
                    touch_assignment("updated_at")
                ),
                params![key, value],
            )
            .map_err(|err| write_error("config", err))?;
        Ok(())
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<ConfigEntry> {
    Ok(ConfigEntry {
        id: row.get("id")?,
        config_key: row.get("config_key")?,
        config_value: row.get("config_value")?,
        description: row.get("description")?,
        updated_at: row.get("updated_at")?,
    })
}
