//! Parameterized query construction for list filters and partial updates.
//!
//! # Responsibility
//! - Assemble `SELECT ... WHERE ... ORDER BY ... LIMIT` statements from
//!   optional criteria.
//! - Assemble `UPDATE ... SET` statements touching only supplied fields.
//!
//! # Invariants
//! - SQL text is built only from `&'static str` fragments. Caller-supplied
//!   values travel exclusively as bound parameters.
//! - Sort columns come from closed per-entity enums ([`SortColumn`]); string
//!   input is checked against that allow-list before it can reach SQL.
//! - Every list query has a deterministic order (`id` breaks ties).

use super::{RepoResult, UpdateOutcome};
use crate::model::validation::ValidationError;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::str::FromStr;

/// Current time as Unix epoch milliseconds, evaluated by SQLite.
pub const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

/// Assignment that moves `column` to now, or one past its old value when the
/// clock has not advanced since the last write.
pub fn touch_assignment(column: &str) -> String {
    format!("{column} = MAX({column} + 1, {NOW_MS_SQL})")
}

/// Closed set of sortable columns for one entity.
pub trait SortColumn: Copy {
    /// Entity name used in validation messages.
    const ENTITY: &'static str;

    /// Fixed column name emitted into `ORDER BY`.
    fn column(self) -> &'static str;
}

/// Declares a sort-column enum with its allow-list and string parsing.
macro_rules! sort_columns {
    (
        $(#[$meta:meta])*
        $name:ident for $entity:literal {
            $($variant:ident => $column:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $crate::repo::query::SortColumn for $name {
            const ENTITY: &'static str = $entity;

            fn column(self) -> &'static str {
                match self {
                    $(Self::$variant => $column),+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::model::validation::ValidationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($column => Ok(Self::$variant),)+
                    _ => Err($crate::model::validation::ValidationError::UnknownSortColumn {
                        entity: $entity,
                        column: value.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use sort_columns;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Column plus direction for a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder<C> {
    pub column: C,
    pub direction: SortDirection,
}

impl<C: SortColumn> SortOrder<C> {
    pub fn asc(column: C) -> Self {
        Self {
            column,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: C) -> Self {
        Self {
            column,
            direction: SortDirection::Desc,
        }
    }
}

impl<C> FromStr for SortOrder<C>
where
    C: SortColumn + FromStr<Err = ValidationError>,
{
    type Err = ValidationError;

    /// Parses `"<column>"` or `"<column> ASC|DESC"` (case-insensitive).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let unknown = || ValidationError::UnknownSortColumn {
            entity: C::ENTITY,
            column: value.to_string(),
        };

        let mut parts = value.split_whitespace();
        let column = parts.next().ok_or_else(unknown)?.parse::<C>()?;
        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(_) => return Err(unknown()),
        };
        if parts.next().is_some() {
            return Err(unknown());
        }

        Ok(Self { column, direction })
    }
}

/// Filtered `SELECT` with AND-ed conditions and bound parameters.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    base: &'static str,
    conditions: Vec<&'static str>,
    params: Vec<Value>,
    order: Option<(&'static str, SortDirection)>,
    limit: Option<u32>,
}

impl SelectQuery {
    /// Starts from `base`, a fixed `SELECT <columns> FROM <table>` fragment.
    pub fn new(base: &'static str) -> Self {
        Self {
            base,
            conditions: Vec::new(),
            params: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Adds a condition whose `?` placeholders bind `params` in order.
    pub fn filter(
        &mut self,
        condition: &'static str,
        params: impl IntoIterator<Item = Value>,
    ) -> &mut Self {
        let before = self.params.len();
        self.params.extend(params);
        debug_assert_eq!(
            condition.matches('?').count(),
            self.params.len() - before,
            "placeholder count mismatch in `{condition}`"
        );
        self.conditions.push(condition);
        self
    }

    /// Adds a parameterless condition when `enabled`.
    pub fn filter_if(&mut self, enabled: bool, condition: &'static str) -> &mut Self {
        if enabled {
            self.filter(condition, []);
        }
        self
    }

    pub fn order_by<C: SortColumn>(&mut self, order: SortOrder<C>) -> &mut Self {
        self.order = Some((order.column.column(), order.direction));
        self
    }

    pub fn limit(&mut self, limit: Option<u32>) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn sql(&self) -> String {
        let mut sql = String::from(self.base);
        for (index, condition) in self.conditions.iter().enumerate() {
            sql.push_str(if index == 0 { " WHERE " } else { " AND " });
            sql.push('(');
            sql.push_str(condition);
            sql.push(')');
        }

        if let Some((column, direction)) = self.order {
            let direction = direction.as_sql();
            sql.push_str(&format!(" ORDER BY {column} {direction}, id {direction}"));
        }

        if self.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }
        sql
    }

    pub fn params(&self) -> Vec<Value> {
        let mut params = self.params.clone();
        if let Some(limit) = self.limit {
            params.push(Value::Integer(i64::from(limit)));
        }
        params
    }

    /// Executes the query and decodes every row with `decode`.
    pub fn fetch<T>(
        &self,
        conn: &Connection,
        mut decode: impl FnMut(&Row<'_>) -> RepoResult<T>,
    ) -> RepoResult<Vec<T>> {
        let mut stmt = conn.prepare(&self.sql())?;
        let mut rows = stmt.query(params_from_iter(self.params()))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(decode(row)?);
        }
        Ok(items)
    }
}

/// `UPDATE <table> SET ...` touching only supplied columns of one row.
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    table: &'static str,
    assignments: Vec<&'static str>,
    params: Vec<Value>,
    touch_column: Option<&'static str>,
}

impl UpdateQuery {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            params: Vec::new(),
            touch_column: None,
        }
    }

    /// Refreshes `column` to the current time whenever the update runs.
    pub fn touch(mut self, column: &'static str) -> Self {
        self.touch_column = Some(column);
        self
    }

    /// Assigns `value` to `column` when present.
    pub fn set<V: Into<Value>>(mut self, column: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.assignments.push(column);
            self.params.push(value.into());
        }
        self
    }

    pub fn set_flag(self, column: &'static str, value: Option<bool>) -> Self {
        self.set(column, value.map(bool_to_int))
    }

    /// `true` when no field was supplied.
    pub fn is_noop(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn sql(&self) -> String {
        let mut assignments = self
            .assignments
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>();
        if let Some(column) = self.touch_column {
            assignments.push(touch_assignment(column));
        }
        format!(
            "UPDATE {} SET {} WHERE id = ?",
            self.table,
            assignments.join(", ")
        )
    }

    /// Runs the update against row `id`.
    ///
    /// Returns `NoOp` without touching the store when nothing was supplied.
    pub fn execute(&self, conn: &Connection, id: i64) -> RepoResult<UpdateOutcome> {
        if self.is_noop() {
            return Ok(UpdateOutcome::NoOp);
        }

        let mut params = self.params.clone();
        params.push(Value::Integer(id));
        let changed = conn
            .execute(&self.sql(), params_from_iter(params))
            .map_err(|err| super::write_error(self.table, err))?;

        Ok(if changed == 0 {
            UpdateOutcome::NotFound
        } else {
            UpdateOutcome::Updated
        })
    }
}

/// Builds a `LIKE ... ESCAPE '\'` pattern matching `needle` as a substring.
pub fn contains_pattern(needle: &str) -> Value {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    Value::Text(escaped)
}

pub fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

/// Returns the trimmed value, or `None` when blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{contains_pattern, SelectQuery, SortColumn, SortDirection, SortOrder, UpdateQuery};
    use crate::model::validation::ValidationError;
    use rusqlite::types::Value;

    sort_columns! {
        DemoColumn for "demo" {
            Name => "name",
            CreatedAt => "created_at",
        }
    }

    #[test]
    fn select_without_criteria_has_no_where_clause() {
        let mut query = SelectQuery::new("SELECT * FROM demo");
        query.order_by(SortOrder::desc(DemoColumn::CreatedAt));
        assert_eq!(
            query.sql(),
            "SELECT * FROM demo ORDER BY created_at DESC, id DESC"
        );
        assert!(query.params().is_empty());
    }

    #[test]
    fn select_binds_values_instead_of_interpolating_them() {
        let hostile = "x'); DROP TABLE demo; --";
        let mut query = SelectQuery::new("SELECT * FROM demo");
        query
            .filter("name LIKE ? ESCAPE '\\'", [contains_pattern(hostile)])
            .filter_if(true, "flag = 1")
            .filter_if(false, "never = 1")
            .limit(Some(5));

        let sql = query.sql();
        assert!(!sql.contains("DROP"));
        assert_eq!(
            sql,
            "SELECT * FROM demo WHERE (name LIKE ? ESCAPE '\\') AND (flag = 1) LIMIT ?"
        );
        assert_eq!(query.params().len(), 2);
        assert_eq!(query.params()[1], Value::Integer(5));
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(
            contains_pattern("50%_a\\b"),
            Value::Text("%50\\%\\_a\\\\b%".to_string())
        );
    }

    #[test]
    fn sort_order_parses_allow_listed_columns_only() {
        let order: SortOrder<DemoColumn> = "created_at desc".parse().unwrap();
        assert_eq!(order.column, DemoColumn::CreatedAt);
        assert_eq!(order.direction, SortDirection::Desc);
        assert_eq!(
            "NAME".parse::<SortOrder<DemoColumn>>().unwrap(),
            SortOrder::asc(DemoColumn::Name)
        );

        for bad in ["name; DROP TABLE demo", "password", "name sideways", ""] {
            let err = bad.parse::<SortOrder<DemoColumn>>().unwrap_err();
            assert!(matches!(err, ValidationError::UnknownSortColumn { entity: "demo", .. }));
        }
        assert_eq!(DemoColumn::Name.column(), "name");
    }

    #[test]
    fn update_lists_only_supplied_columns() {
        let update = UpdateQuery::new("demo")
            .touch("updated_at")
            .set("name", Some("renamed".to_string()))
            .set::<i64>("priority", None)
            .set_flag("flag", Some(true));

        assert!(!update.is_noop());
        assert_eq!(
            update.sql(),
            format!(
                "UPDATE demo SET name = ?, flag = ?, updated_at = MAX(updated_at + 1, {}) WHERE id = ?",
                super::NOW_MS_SQL
            )
        );
    }

    #[test]
    fn update_without_fields_is_noop() {
        let update = UpdateQuery::new("demo")
            .touch("updated_at")
            .set::<String>("name", None);
        assert!(update.is_noop());
    }
}
