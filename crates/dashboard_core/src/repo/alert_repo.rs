//! Alert repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Alerts are append/update-only; there is no delete path.
//! - New alerts are always inserted unread.

use super::query::{sort_columns, SelectQuery, SortOrder, UpdateQuery};
use super::{int_to_bool, write_error, RepoResult, UpdateOutcome};
use crate::model::alert::{Alert, AlertPatch, NewAlert};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ALERT_SELECT_SQL: &str = "SELECT
    id,
    title,
    message,
    priority,
    is_read,
    created_at
FROM alerts";

sort_columns! {
    /// Sortable alert columns.
    AlertSort for "alerts" {
        Id => "id",
        Title => "title",
        Priority => "priority",
        CreatedAt => "created_at",
    }
}

/// Optional criteria for listing alerts. The default matches every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertListQuery {
    pub unread_only: bool,
    pub priority: Option<i64>,
    pub limit: Option<u32>,
    pub order: SortOrder<AlertSort>,
}

impl Default for AlertListQuery {
    fn default() -> Self {
        Self {
            unread_only: false,
            priority: None,
            limit: None,
            order: SortOrder::desc(AlertSort::CreatedAt),
        }
    }
}

pub trait AlertRepository {
    fn list_alerts(&self, query: &AlertListQuery) -> RepoResult<Vec<Alert>>;
    fn get_alert(&self, id: i64) -> RepoResult<Option<Alert>>;
    fn create_alert(&self, alert: &NewAlert) -> RepoResult<i64>;
    fn update_alert(&self, id: i64, patch: &AlertPatch) -> RepoResult<UpdateOutcome>;
    /// Sets the read flag explicitly, in either direction.
    fn mark_alert_read(&self, id: i64, read: bool) -> RepoResult<UpdateOutcome>;
}

pub struct SqliteAlertRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAlertRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AlertRepository for SqliteAlertRepository<'_> {
    fn list_alerts(&self, query: &AlertListQuery) -> RepoResult<Vec<Alert>> {
        let mut select = SelectQuery::new(ALERT_SELECT_SQL);
        select.filter_if(query.unread_only, "is_read = 0");
        if let Some(priority) = query.priority {
            select.filter("priority = ?", [Value::Integer(priority)]);
        }
        select.order_by(query.order).limit(query.limit);

        select.fetch(self.conn, parse_alert_row)
    }

    fn get_alert(&self, id: i64) -> RepoResult<Option<Alert>> {
        self.conn
            .query_row(
                &format!("{ALERT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_alert_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn create_alert(&self, alert: &NewAlert) -> RepoResult<i64> {
        alert.validate()?;

        self.conn
            .execute(
                "INSERT INTO alerts (title, message, priority, is_read) VALUES (?1, ?2, ?3, 0);",
                params![alert.title.trim(), alert.message.as_deref(), alert.priority],
            )
            .map_err(|err| write_error("alerts", err))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_alert(&self, id: i64, patch: &AlertPatch) -> RepoResult<UpdateOutcome> {
        patch.validate()?;

        UpdateQuery::new("alerts")
            .set("title", patch.title.as_deref().map(|title| title.trim().to_string()))
            .set("message", patch.message.clone())
            .set("priority", patch.priority)
            .set_flag("is_read", patch.is_read)
            .execute(self.conn, id)
    }

    fn mark_alert_read(&self, id: i64, read: bool) -> RepoResult<UpdateOutcome> {
        self.update_alert(
            id,
            &AlertPatch {
                is_read: Some(read),
                ..AlertPatch::default()
            },
        )
    }
}

fn parse_alert_row(row: &Row<'_>) -> RepoResult<Alert> {
    Ok(Alert {
        id: row.get("id")?,
        title: row.get("title")?,
        message: row.get("message")?,
        priority: row.get("priority")?,
        is_read: int_to_bool("alerts", "is_read", row.get("is_read")?)?,
        created_at: row.get("created_at")?,
    })
}
