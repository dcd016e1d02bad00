//! Work repository contracts and SQLite implementation.
//!
//! # Invariants
//! - "Overdue" means `deadline` before today's date and status not completed.
//! - Every effective update refreshes `updated_at`.

use super::query::{contains_pattern, non_blank, sort_columns, SelectQuery, SortOrder, UpdateQuery};
use super::{write_error, RepoError, RepoResult, UpdateOutcome};
use crate::model::work::{NewWork, Work, WorkPatch, WorkStatus};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

const WORK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    status,
    priority,
    deadline,
    assigned_to,
    progress,
    created_at,
    updated_at
FROM works";

sort_columns! {
    WorkSort for "works" {
        Id => "id",
        Title => "title",
        Status => "status",
        Priority => "priority",
        Deadline => "deadline",
        Progress => "progress",
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkListQuery {
    pub status: Option<WorkStatus>,
    pub priority: Option<i64>,
    /// Substring match on `assigned_to`.
    pub assigned_to: Option<String>,
    pub overdue_only: bool,
    pub order: SortOrder<WorkSort>,
}

impl Default for WorkListQuery {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            assigned_to: None,
            overdue_only: false,
            order: SortOrder::desc(WorkSort::CreatedAt),
        }
    }
}

pub trait WorkRepository {
    fn list_works(&self, query: &WorkListQuery) -> RepoResult<Vec<Work>>;
    fn get_work(&self, id: i64) -> RepoResult<Option<Work>>;
    fn create_work(&self, work: &NewWork) -> RepoResult<i64>;
    fn update_work(&self, id: i64, patch: &WorkPatch) -> RepoResult<UpdateOutcome>;
}

pub struct SqliteWorkRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorkRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl WorkRepository for SqliteWorkRepository<'_> {
    fn list_works(&self, query: &WorkListQuery) -> RepoResult<Vec<Work>> {
        let mut select = SelectQuery::new(WORK_SELECT_SQL);
        if let Some(status) = query.status {
            select.filter("status = ?", [Value::Text(status.as_str().to_string())]);
        }
        if let Some(priority) = query.priority {
            select.filter("priority = ?", [Value::Integer(priority)]);
        }
        if let Some(assignee) = non_blank(query.assigned_to.as_deref()) {
            select.filter(
                "assigned_to LIKE ? ESCAPE '\\'",
                [contains_pattern(assignee)],
            );
        }
        select.filter_if(
            query.overdue_only,
            "deadline IS NOT NULL AND deadline < date('now') AND status != 'completed'",
        );
        select.order_by(query.order);

        select.fetch(self.conn, parse_work_row)
    }

    fn get_work(&self, id: i64) -> RepoResult<Option<Work>> {
        self.conn
            .query_row(
                &format!("{WORK_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_work_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn create_work(&self, work: &NewWork) -> RepoResult<i64> {
        work.validate()?;

        self.conn
            .execute(
                "INSERT INTO works (
                    title,
                    description,
                    status,
                    priority,
                    deadline,
                    assigned_to,
                    progress
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    work.title.trim(),
                    work.description.as_deref(),
                    work.status.as_str(),
                    work.priority,
                    work.deadline.as_deref(),
                    work.assigned_to.as_deref(),
                    work.progress,
                ],
            )
            .map_err(|err| write_error("works", err))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_work(&self, id: i64, patch: &WorkPatch) -> RepoResult<UpdateOutcome> {
        patch.validate()?;

        UpdateQuery::new("works")
            .touch("updated_at")
            .set("title", patch.title.as_deref().map(|v| v.trim().to_string()))
            .set("description", patch.description.clone())
            .set("status", patch.status.map(|s| s.as_str().to_string()))
            .set("priority", patch.priority)
            .set("deadline", patch.deadline.clone())
            .set("assigned_to", patch.assigned_to.clone())
            .set("progress", patch.progress)
            .execute(self.conn, id)
    }
}

fn parse_work_row(row: &Row<'_>) -> RepoResult<Work> {
    let status_text: String = row.get("status")?;
    let status = status_text.parse::<WorkStatus>().map_err(|_| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in works.status"))
    })?;

    Ok(Work {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        priority: row.get("priority")?,
        deadline: row.get("deadline")?,
        assigned_to: row.get("assigned_to")?,
        progress: row.get("progress")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
