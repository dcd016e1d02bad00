use dashboard_core::db::migrations::{apply_migrations, latest_version, TABLES};
use dashboard_core::db::{open_connection, open_connection_in_memory, DbError, Store};
use rusqlite::Connection;

#[test]
fn in_memory_store_applies_all_migrations() {
    let store = Store::open_in_memory().unwrap();
    store.ensure_schema().unwrap();

    store
        .with_connection(|conn| {
            assert_eq!(schema_version(conn), latest_version());
            for table in TABLES {
                assert_table_exists(conn, table);
            }
            Ok::<_, DbError>(())
        })
        .unwrap();
}

#[test]
fn ensure_schema_is_idempotent_on_one_handle() {
    let store = Store::open_in_memory().unwrap();
    store.ensure_schema().unwrap();
    store.ensure_schema().unwrap();

    let version = store
        .with_connection(|conn| Ok::<_, DbError>(schema_version(conn)))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn applying_migrations_twice_applies_nothing_the_second_time() {
    let mut conn = open_connection_in_memory().unwrap();
    assert_eq!(apply_migrations(&mut conn).unwrap(), 2);
    assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
}

#[test]
fn two_handles_on_same_file_converge() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("dashboard.db");

    let first = Store::open(&path).unwrap();
    first.ensure_schema().unwrap();
    let second = Store::open(&path).unwrap();
    second.ensure_schema().unwrap();

    assert_eq!(second.path(), Some(path.as_path()));
    let conn = open_connection(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "warehouse");
}

#[test]
fn pre_existing_tables_without_version_are_adopted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE alerts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            message TEXT,
            priority INTEGER NOT NULL DEFAULT 1,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL DEFAULT 0
        );
        INSERT INTO alerts (title) VALUES ('kept');",
    )
    .unwrap();
    drop(conn);

    let store = Store::open(&path).unwrap();
    store.ensure_schema().unwrap();

    let conn = open_connection(&path).unwrap();
    let title: String = conn
        .query_row("SELECT title FROM alerts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(title, "kept");
    assert_table_exists(&conn, "config");
}

#[test]
fn store_with_newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let store = Store::open(&path).unwrap();
    match store.ensure_schema().unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn connections_enforce_foreign_keys_and_busy_timeout() {
    let conn = open_connection_in_memory().unwrap();
    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    let busy_timeout: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
    assert_eq!(busy_timeout, 5000);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "missing table {table_name}");
}
