//! Planning repository contracts and SQLite implementation.

use super::query::{contains_pattern, non_blank, sort_columns, SelectQuery, SortOrder, UpdateQuery};
use super::{delete_by_id, write_error, DeleteOutcome, RepoResult, UpdateOutcome};
use crate::model::planning::{NewPlanningItem, PlanningItem, PlanningPatch};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PLANNING_SELECT_SQL: &str = "SELECT id, name, text, created_at, updated_at FROM planning";

sort_columns! {
    PlanningSort for "planning" {
        Id => "id",
        Name => "name",
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningListQuery {
    /// Substring match on `name` or `text`.
    pub search: Option<String>,
    pub order: SortOrder<PlanningSort>,
}

impl Default for PlanningListQuery {
    fn default() -> Self {
        Self {
            search: None,
            order: SortOrder::desc(PlanningSort::CreatedAt),
        }
    }
}

pub trait PlanningRepository {
    fn list_planning(&self, query: &PlanningListQuery) -> RepoResult<Vec<PlanningItem>>;
    fn get_planning_item(&self, id: i64) -> RepoResult<Option<PlanningItem>>;
    fn create_planning_item(&self, item: &NewPlanningItem) -> RepoResult<i64>;
    fn update_planning_item(&self, id: i64, patch: &PlanningPatch) -> RepoResult<UpdateOutcome>;
    fn delete_planning_item(&self, id: i64) -> RepoResult<DeleteOutcome>;
}

pub struct SqlitePlanningRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlanningRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PlanningRepository for SqlitePlanningRepository<'_> {
    fn list_planning(&self, query: &PlanningListQuery) -> RepoResult<Vec<PlanningItem>> {
        let mut select = SelectQuery::new(PLANNING_SELECT_SQL);
        if let Some(search) = non_blank(query.search.as_deref()) {
            let pattern = contains_pattern(search);
            select.filter(
                "name LIKE ? ESCAPE '\\' OR text LIKE ? ESCAPE '\\'",
                [pattern.clone(), pattern],
            );
        }
        select.order_by(query.order);

        select.fetch(self.conn, parse_planning_row)
    }

    fn get_planning_item(&self, id: i64) -> RepoResult<Option<PlanningItem>> {
        self.conn
            .query_row(
                &format!("{PLANNING_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_planning_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn create_planning_item(&self, item: &NewPlanningItem) -> RepoResult<i64> {
        item.validate()?;

        self.conn
            .execute(
                "INSERT INTO planning (name, text) VALUES (?1, ?2);",
                params![item.name.trim(), item.text],
            )
            .map_err(|err| write_error("planning", err))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_planning_item(&self, id: i64, patch: &PlanningPatch) -> RepoResult<UpdateOutcome> {
        patch.validate()?;

        UpdateQuery::new("planning")
            .touch("updated_at")
            .set("name", patch.name.as_deref().map(|v| v.trim().to_string()))
            .set("text", patch.text.clone())
            .execute(self.conn, id)
    }

    fn delete_planning_item(&self, id: i64) -> RepoResult<DeleteOutcome> {
        delete_by_id(self.conn, "planning", id)
    }
}

fn parse_planning_row(row: &Row<'_>) -> RepoResult<PlanningItem> {
    Ok(PlanningItem {
        id: row.get("id")?,
        name: row.get("name")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
