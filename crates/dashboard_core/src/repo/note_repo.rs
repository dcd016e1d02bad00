//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide note CRUD with search and alert/planning flag filters.
//!
//! # Invariants
//! - `name` is required and at most 255 characters on every write path.
//! - Delete is a hard delete of exactly one row.

use super::query::{
    bool_to_int, contains_pattern, non_blank, sort_columns, SelectQuery, SortOrder, UpdateQuery,
};
use super::{delete_by_id, int_to_bool, write_error, DeleteOutcome, RepoResult, UpdateOutcome};
use crate::model::note::{NewNote, Note, NotePatch};
use rusqlite::{params, Connection, Row};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    name,
    text,
    is_alert,
    is_planing,
    alert_time,
    created_at,
    updated_at
FROM notes";

sort_columns! {
    NoteSort for "notes" {
        Id => "id",
        Name => "name",
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
    }
}

/// Query options for note list use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListQuery {
    /// Substring match on `name` or `text`.
    pub search: Option<String>,
    pub alerts_only: bool,
    pub planning_only: bool,
    pub order: SortOrder<NoteSort>,
}

impl Default for NoteListQuery {
    fn default() -> Self {
        Self {
            search: None,
            alerts_only: false,
            planning_only: false,
            order: SortOrder::desc(NoteSort::CreatedAt),
        }
    }
}

pub trait NoteRepository {
    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    fn get_note(&self, id: i64) -> RepoResult<Option<Note>>;
    fn create_note(&self, note: &NewNote) -> RepoResult<i64>;
    fn update_note(&self, id: i64, patch: &NotePatch) -> RepoResult<UpdateOutcome>;
    fn delete_note(&self, id: i64) -> RepoResult<DeleteOutcome>;
}

pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let mut select = SelectQuery::new(NOTE_SELECT_SQL);
        if let Some(search) = non_blank(query.search.as_deref()) {
            let pattern = contains_pattern(search);
            select.filter(
                "name LIKE ? ESCAPE '\\' OR text LIKE ? ESCAPE '\\'",
                [pattern.clone(), pattern],
            );
        }
        select
            .filter_if(query.alerts_only, "is_alert = 1")
            .filter_if(query.planning_only, "is_planing = 1")
            .order_by(query.order);

        select.fetch(self.conn, parse_note_row)
    }

    fn get_note(&self, id: i64) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn create_note(&self, note: &NewNote) -> RepoResult<i64> {
        note.validate()?;

        self.conn
            .execute(
                "INSERT INTO notes (name, text, is_alert, is_planing, alert_time)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    note.name.trim(),
                    note.text,
                    bool_to_int(note.is_alert),
                    bool_to_int(note.is_planing),
                    note.alert_time,
                ],
            )
            .map_err(|err| write_error("notes", err))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_note(&self, id: i64, patch: &NotePatch) -> RepoResult<UpdateOutcome> {
        patch.validate()?;

        UpdateQuery::new("notes")
            .touch("updated_at")
            .set("name", patch.name.as_deref().map(|v| v.trim().to_string()))
            .set("text", patch.text.clone())
            .set_flag("is_alert", patch.is_alert)
            .set_flag("is_planing", patch.is_planing)
            .set("alert_time", patch.alert_time.clone())
            .execute(self.conn, id)
    }

    fn delete_note(&self, id: i64) -> RepoResult<DeleteOutcome> {
        delete_by_id(self.conn, "notes", id)
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    Ok(Note {
        id: row.get("id")?,
        name: row.get("name")?,
        text: row.get("text")?,
        is_alert: int_to_bool("notes", "is_alert", row.get("is_alert")?)?,
        is_planing: int_to_bool("notes", "is_planing", row.get("is_planing")?)?,
        alert_time: row.get("alert_time")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
