//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - The `password` column is written but never selected.
//! - `username` and `email` clashes surface as conflicts, with no partial row.

use super::query::{bool_to_int, sort_columns, SelectQuery, SortOrder, UpdateQuery, NOW_MS_SQL};
use super::{int_to_bool, write_error, RepoResult, UpdateOutcome};
use crate::model::user::{NewUser, User, UserPatch};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    active,
    created_at,
    last_login
FROM users";

sort_columns! {
    UserSort for "users" {
        Username => "username",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserListQuery {
    pub active_only: bool,
}

impl Default for UserListQuery {
    fn default() -> Self {
        Self { active_only: true }
    }
}

pub trait UserRepository {
    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>>;
    fn get_user(&self, id: i64) -> RepoResult<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn create_user(&self, user: &NewUser) -> RepoResult<i64>;
    fn update_user(&self, id: i64, patch: &UserPatch) -> RepoResult<UpdateOutcome>;
    /// Stamps `last_login` with the current time.
    fn record_login(&self, id: i64) -> RepoResult<UpdateOutcome>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get_where(&self, condition: &'static str, key: Value) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE {condition};"),
                [key],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?
            .transpose()
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        let mut select = SelectQuery::new(USER_SELECT_SQL);
        select
            .filter_if(query.active_only, "active = 1")
            .order_by(SortOrder::asc(UserSort::Username));

        select.fetch(self.conn, parse_user_row)
    }

    fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        self.get_where("id = ?1", Value::Integer(id))
    }

    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.get_where("username = ?1", Value::Text(username.trim().to_string()))
    }

    fn create_user(&self, user: &NewUser) -> RepoResult<i64> {
        user.validate()?;

        self.conn
            .execute(
                "INSERT INTO users (username, password, email, active) VALUES (?1, ?2, ?3, ?4);",
                params![
                    user.username.trim(),
                    user.password,
                    user.email.trim(),
                    bool_to_int(true),
                ],
            )
            .map_err(|err| write_error("users", err))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_user(&self, id: i64, patch: &UserPatch) -> RepoResult<UpdateOutcome> {
        patch.validate()?;

        UpdateQuery::new("users")
            .set("email", patch.email.as_deref().map(|v| v.trim().to_string()))
            .set("password", patch.password.clone())
            .set_flag("active", patch.active)
            .execute(self.conn, id)
    }

    fn record_login(&self, id: i64) -> RepoResult<UpdateOutcome> {
        let changed = self.conn.execute(
            &format!("UPDATE users SET last_login = {NOW_MS_SQL} WHERE id = ?1;"),
            [id],
        )?;
        Ok(if changed == 0 {
            UpdateOutcome::NotFound
        } else {
            UpdateOutcome::Updated
        })
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        active: int_to_bool("users", "active", row.get("active")?)?,
        created_at: row.get("created_at")?,
        last_login: row.get("last_login")?,
    })
}
