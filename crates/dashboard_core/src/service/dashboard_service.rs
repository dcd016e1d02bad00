//! Dashboard use-case service.
//!
//! # Responsibility
//! - Provide one entry point per dashboard operation for boundary callers.
//! - Scope a store connection to each call and hand it to the repository.
//!
//! # Invariants
//! - Schema exists before any repository runs.
//! - List reads degrade: a store failure is logged and yields an empty result.
//! - Single-row reads and every write propagate their errors.

use crate::db::migrations::TABLES;
use crate::db::{DbError, SeedReport, Store};
use crate::model::alert::{Alert, AlertPatch, NewAlert};
use crate::model::config_entry::ConfigEntry;
use crate::model::note::{NewNote, Note, NotePatch};
use crate::model::planning::{NewPlanningItem, PlanningItem, PlanningPatch};
use crate::model::user::{NewUser, User, UserPatch};
use crate::model::warehouse::{NewWarehouseItem, WarehouseItem, WarehousePatch};
use crate::model::work::{NewWork, Work, WorkPatch};
use crate::repo::alert_repo::{AlertListQuery, AlertRepository, SqliteAlertRepository};
use crate::repo::config_repo::{ConfigRepository, SqliteConfigRepository};
use crate::repo::note_repo::{NoteListQuery, NoteRepository, SqliteNoteRepository};
use crate::repo::planning_repo::{PlanningListQuery, PlanningRepository, SqlitePlanningRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserListQuery, UserRepository};
use crate::repo::warehouse_repo::{
    SqliteWarehouseRepository, WarehouseListQuery, WarehouseRepository,
};
use crate::repo::work_repo::{SqliteWorkRepository, WorkListQuery, WorkRepository};
use crate::repo::{DeleteOutcome, RepoError, RepoResult, UpdateOutcome};
use log::{error, warn};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Facade over every dashboard repository, bound to one [`Store`].
pub struct DashboardService {
    store: Store,
}

impl DashboardService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Ensures schema and seeds empty tables.
    pub fn initialize(&self) -> Result<SeedReport, DbError> {
        self.store.initialize()
    }

    /// Row count per table, in schema order.
    pub fn table_counts(&self) -> RepoResult<Vec<(&'static str, i64)>> {
        self.run("table_counts", "-", |conn| {
            TABLES
                .iter()
                .map(|&table| -> RepoResult<(&'static str, i64)> {
                    let count = conn.query_row(
                        &format!("SELECT COUNT(*) FROM {table};"),
                        [],
                        |row| row.get::<_, i64>(0),
                    )?;
                    Ok((table, count))
                })
                .collect()
        })
    }

    // Alerts

    pub fn list_alerts(&self, query: &AlertListQuery) -> Vec<Alert> {
        self.read_or_empty("list_alerts", "all", |conn| {
            SqliteAlertRepository::new(conn).list_alerts(query)
        })
    }

    pub fn get_alert(&self, id: i64) -> RepoResult<Option<Alert>> {
        self.run("get_alert", id, |conn| SqliteAlertRepository::new(conn).get_alert(id))
    }

    pub fn create_alert(&self, alert: &NewAlert) -> RepoResult<i64> {
        self.run("create_alert", &alert.title, |conn| {
            SqliteAlertRepository::new(conn).create_alert(alert)
        })
    }

    pub fn update_alert(&self, id: i64, patch: &AlertPatch) -> RepoResult<UpdateOutcome> {
        self.run("update_alert", id, |conn| {
            SqliteAlertRepository::new(conn).update_alert(id, patch)
        })
    }

    pub fn mark_alert_read(&self, id: i64, read: bool) -> RepoResult<UpdateOutcome> {
        self.run("mark_alert_read", id, |conn| {
            SqliteAlertRepository::new(conn).mark_alert_read(id, read)
        })
    }

    // Works

    pub fn list_works(&self, query: &WorkListQuery) -> Vec<Work> {
        self.read_or_empty("list_works", "all", |conn| {
            SqliteWorkRepository::new(conn).list_works(query)
        })
    }

    pub fn get_work(&self, id: i64) -> RepoResult<Option<Work>> {
        self.run("get_work", id, |conn| SqliteWorkRepository::new(conn).get_work(id))
    }

    pub fn create_work(&self, work: &NewWork) -> RepoResult<i64> {
        self.run("create_work", &work.title, |conn| {
            SqliteWorkRepository::new(conn).create_work(work)
        })
    }

    pub fn update_work(&self, id: i64, patch: &WorkPatch) -> RepoResult<UpdateOutcome> {
        self.run("update_work", id, |conn| SqliteWorkRepository::new(conn).update_work(id, patch))
    }

    // Notes

    pub fn list_notes(&self, query: &NoteListQuery) -> Vec<Note> {
        self.read_or_empty("list_notes", "all", |conn| {
            SqliteNoteRepository::new(conn).list_notes(query)
        })
    }

    pub fn get_note(&self, id: i64) -> RepoResult<Option<Note>> {
        self.run("get_note", id, |conn| SqliteNoteRepository::new(conn).get_note(id))
    }

    pub fn create_note(&self, note: &NewNote) -> RepoResult<i64> {
        self.run("create_note", &note.name, |conn| {
            SqliteNoteRepository::new(conn).create_note(note)
        })
    }

    pub fn update_note(&self, id: i64, patch: &NotePatch) -> RepoResult<UpdateOutcome> {
        self.run("update_note", id, |conn| SqliteNoteRepository::new(conn).update_note(id, patch))
    }

    pub fn delete_note(&self, id: i64) -> RepoResult<DeleteOutcome> {
        self.run("delete_note", id, |conn| SqliteNoteRepository::new(conn).delete_note(id))
    }

    // Planning

    pub fn list_planning(&self, query: &PlanningListQuery) -> Vec<PlanningItem> {
        self.read_or_empty("list_planning", "all", |conn| {
            SqlitePlanningRepository::new(conn).list_planning(query)
        })
    }

    pub fn get_planning_item(&self, id: i64) -> RepoResult<Option<PlanningItem>> {
        self.run("get_planning_item", id, |conn| {
            SqlitePlanningRepository::new(conn).get_planning_item(id)
        })
    }

    pub fn create_planning_item(&self, item: &NewPlanningItem) -> RepoResult<i64> {
        self.run("create_planning_item", &item.name, |conn| {
            SqlitePlanningRepository::new(conn).create_planning_item(item)
        })
    }

    pub fn update_planning_item(
        &self,
        id: i64,
        patch: &PlanningPatch,
    ) -> RepoResult<UpdateOutcome> {
        self.run("update_planning_item", id, |conn| {
            SqlitePlanningRepository::new(conn).update_planning_item(id, patch)
        })
    }

    pub fn delete_planning_item(&self, id: i64) -> RepoResult<DeleteOutcome> {
        self.run("delete_planning_item", id, |conn| {
            SqlitePlanningRepository::new(conn).delete_planning_item(id)
        })
    }

    // Warehouse

    pub fn list_warehouse(&self, query: &WarehouseListQuery) -> Vec<WarehouseItem> {
        self.read_or_empty("list_warehouse", "all", |conn| {
            SqliteWarehouseRepository::new(conn).list_items(query)
        })
    }

    pub fn get_warehouse_item(&self, id: i64) -> RepoResult<Option<WarehouseItem>> {
        self.run("get_warehouse_item", id, |conn| SqliteWarehouseRepository::new(conn).get_item(id))
    }

    pub fn get_warehouse_item_by_code(&self, code: &str) -> RepoResult<Option<WarehouseItem>> {
        self.run("get_warehouse_item_by_code", code, |conn| {
            SqliteWarehouseRepository::new(conn).get_item_by_code(code)
        })
    }

    pub fn add_warehouse_item(&self, item: &NewWarehouseItem) -> RepoResult<i64> {
        self.run("add_warehouse_item", &item.code, |conn| {
            SqliteWarehouseRepository::new(conn).add_item(item)
        })
    }

    pub fn update_warehouse_item(
        &self,
        id: i64,
        patch: &WarehousePatch,
    ) -> RepoResult<UpdateOutcome> {
        self.run("update_warehouse_item", id, |conn| {
            SqliteWarehouseRepository::new(conn).update_item(id, patch)
        })
    }

    /// Overwrites the stored quantity. Rejects negative values before SQL.
    pub fn update_warehouse_quantity(&self, id: i64, quantity: i64) -> RepoResult<UpdateOutcome> {
        self.run("update_warehouse_quantity", id, |conn| {
            SqliteWarehouseRepository::new(conn).update_quantity(id, quantity)
        })
    }

    pub fn delete_warehouse_item(&self, id: i64) -> RepoResult<DeleteOutcome> {
        self.run("delete_warehouse_item", id, |conn| {
            SqliteWarehouseRepository::new(conn).delete_item(id)
        })
    }

    // Users

    pub fn list_users(&self, query: &UserListQuery) -> Vec<User> {
        self.read_or_empty("list_users", "all", |conn| {
            SqliteUserRepository::new(conn).list_users(query)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        self.run("get_user_by_id", id, |conn| SqliteUserRepository::new(conn).get_user(id))
    }

    pub fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.run("get_user_by_username", username, |conn| {
            SqliteUserRepository::new(conn).get_user_by_username(username)
        })
    }

    pub fn create_user(&self, user: &NewUser) -> RepoResult<i64> {
        self.run("create_user", &user.username, |conn| {
            SqliteUserRepository::new(conn).create_user(user)
        })
    }

    pub fn update_user(&self, id: i64, patch: &UserPatch) -> RepoResult<UpdateOutcome> {
        self.run("update_user", id, |conn| SqliteUserRepository::new(conn).update_user(id, patch))
    }

    pub fn record_login(&self, id: i64) -> RepoResult<UpdateOutcome> {
        self.run("record_login", id, |conn| SqliteUserRepository::new(conn).record_login(id))
    }

    // Config

    pub fn get_config(&self, key: &str) -> RepoResult<Option<String>> {
        self.run("get_config", key, |conn| SqliteConfigRepository::new(conn).get_config(key))
    }

    pub fn get_all_config(&self) -> BTreeMap<String, String> {
        self.read_or_empty("get_all_config", "all", |conn| {
            SqliteConfigRepository::new(conn).get_all_config()
        })
    }

    pub fn list_config_entries(&self) -> Vec<ConfigEntry> {
        self.read_or_empty("list_config_entries", "all", |conn| {
            SqliteConfigRepository::new(conn).list_entries()
        })
    }

    pub fn set_config(&self, key: &str, value: &str) -> RepoResult<()> {
        self.run("set_config", key, |conn| SqliteConfigRepository::new(conn).set_config(key, value))
    }

    fn run<T>(
        &self,
        operation: &'static str,
        target: impl Display,
        op: impl FnOnce(&Connection) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let result = self
            .store
            .ensure_schema()
            .map_err(RepoError::from)
            .and_then(|()| self.store.with_connection::<T, RepoError>(|conn| op(conn)));
        if let Err(RepoError::Db(err)) = &result {
            error!("{}", store_failure_message(operation, &target, err));
        }
        result
    }

    fn read_or_empty<T: Default>(
        &self,
        operation: &'static str,
        target: &str,
        op: impl FnOnce(&Connection) -> RepoResult<T>,
    ) -> T {
        match self.run(operation, target, op) {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "event=read_degraded module=service status=empty op={}",
                    operation
                );
                T::default()
            }
        }
    }
}

fn store_failure_message(operation: &str, target: &dyn Display, err: &DbError) -> String {
    format!("event=store_op module=service status=error op={operation} target={target} error={err}")
}
