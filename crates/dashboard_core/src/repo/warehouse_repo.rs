//! Warehouse repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `code` uniqueness is enforced by the store; clashes map to
//!   [`RepoError::Conflict`](super::RepoError::Conflict).
//! - Negative quantities are rejected before any SQL is issued.
//!
//! Quantity updates are last-writer-wins: two callers that read a quantity
//! and write back an adjusted value concurrently can lose one adjustment.
//! There is no version column to detect this.

use super::query::{contains_pattern, non_blank, sort_columns, SelectQuery, SortOrder, UpdateQuery};
use super::{delete_by_id, write_error, DeleteOutcome, RepoResult, UpdateOutcome};
use crate::model::validation::non_negative_quantity;
use crate::model::warehouse::{NewWarehouseItem, WarehouseItem, WarehousePatch};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

const WAREHOUSE_SELECT_SQL: &str = "SELECT
    id,
    name,
    code,
    quantity,
    note,
    created_at,
    updated_at
FROM warehouse";

sort_columns! {
    WarehouseSort for "warehouse" {
        Id => "id",
        Name => "name",
        Code => "code",
        Quantity => "quantity",
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseListQuery {
    /// Substring match on `name`, `code` or `note`.
    pub search: Option<String>,
    /// Low-stock filter: only items with `quantity <= max_quantity`.
    pub max_quantity: Option<i64>,
    pub order: SortOrder<WarehouseSort>,
}

impl Default for WarehouseListQuery {
    fn default() -> Self {
        Self {
            search: None,
            max_quantity: None,
            order: SortOrder::asc(WarehouseSort::Name),
        }
    }
}

pub trait WarehouseRepository {
    fn list_items(&self, query: &WarehouseListQuery) -> RepoResult<Vec<WarehouseItem>>;
    fn get_item(&self, id: i64) -> RepoResult<Option<WarehouseItem>>;
    fn get_item_by_code(&self, code: &str) -> RepoResult<Option<WarehouseItem>>;
    fn add_item(&self, item: &NewWarehouseItem) -> RepoResult<i64>;
    fn update_item(&self, id: i64, patch: &WarehousePatch) -> RepoResult<UpdateOutcome>;
    fn update_quantity(&self, id: i64, quantity: i64) -> RepoResult<UpdateOutcome>;
    fn delete_item(&self, id: i64) -> RepoResult<DeleteOutcome>;
}

pub struct SqliteWarehouseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWarehouseRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get_where(&self, condition: &'static str, key: Value) -> RepoResult<Option<WarehouseItem>> {
        self.conn
            .query_row(
                &format!("{WAREHOUSE_SELECT_SQL} WHERE {condition};"),
                [key],
                |row| Ok(parse_item_row(row)),
            )
            .optional()?
            .transpose()
    }
}

impl WarehouseRepository for SqliteWarehouseRepository<'_> {
    fn list_items(&self, query: &WarehouseListQuery) -> RepoResult<Vec<WarehouseItem>> {
        let mut select = SelectQuery::new(WAREHOUSE_SELECT_SQL);
        if let Some(search) = non_blank(query.search.as_deref()) {
            let pattern = contains_pattern(search);
            select.filter(
                "name LIKE ? ESCAPE '\\' OR code LIKE ? ESCAPE '\\' OR note LIKE ? ESCAPE '\\'",
                [pattern.clone(), pattern.clone(), pattern],
            );
        }
        if let Some(max_quantity) = query.max_quantity {
            select.filter("quantity <= ?", [Value::Integer(max_quantity)]);
        }
        select.order_by(query.order);

        select.fetch(self.conn, parse_item_row)
    }

    fn get_item(&self, id: i64) -> RepoResult<Option<WarehouseItem>> {
        self.get_where("id = ?1", Value::Integer(id))
    }

    fn get_item_by_code(&self, code: &str) -> RepoResult<Option<WarehouseItem>> {
        self.get_where("code = ?1", Value::Text(code.trim().to_string()))
    }

    fn add_item(&self, item: &NewWarehouseItem) -> RepoResult<i64> {
        item.validate()?;

        self.conn
            .execute(
                "INSERT INTO warehouse (name, code, quantity, note) VALUES (?1, ?2, ?3, ?4);",
                params![item.name.trim(), item.code.trim(), item.quantity, item.note],
            )
            .map_err(|err| write_error("warehouse", err))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_item(&self, id: i64, patch: &WarehousePatch) -> RepoResult<UpdateOutcome> {
        patch.validate()?;

        UpdateQuery::new("warehouse")
            .touch("updated_at")
            .set("name", patch.name.as_deref().map(|v| v.trim().to_string()))
            .set("code", patch.code.as_deref().map(|v| v.trim().to_string()))
            .set("quantity", patch.quantity)
            .set("note", patch.note.clone())
            .execute(self.conn, id)
    }

    fn update_quantity(&self, id: i64, quantity: i64) -> RepoResult<UpdateOutcome> {
        non_negative_quantity(quantity)?;

        UpdateQuery::new("warehouse")
            .touch("updated_at")
            .set("quantity", Some(quantity))
            .execute(self.conn, id)
    }

    fn delete_item(&self, id: i64) -> RepoResult<DeleteOutcome> {
        delete_by_id(self.conn, "warehouse", id)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<WarehouseItem> {
    Ok(WarehouseItem {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        quantity: row.get("quantity")?,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
