//! Explicit store handle with scoped connection acquisition.
//!
//! # Responsibility
//! - Hand out one connection per operation and release it on every exit path.
//! - Guard schema initialization so it runs at most once per handle.
//!
//! # Invariants
//! - File-backed stores open a fresh connection per call; nothing is held
//!   between calls.
//! - In-memory stores share one connection behind a mutex; the guard is
//!   dropped when the closure returns.

use super::migrations::apply_migrations;
use super::open::{open_connection, open_connection_in_memory};
use super::seed::{seed_if_empty, SeedReport};
use super::{DbError, DbResult};
use log::{error, info};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

enum Backend {
    File(PathBuf),
    Memory(Mutex<Connection>),
}

/// Handle to the dashboard SQLite store.
pub struct Store {
    backend: Backend,
    schema_ready: OnceCell<()>,
}

impl Store {
    /// Creates a handle to a file-backed store.
    ///
    /// The parent directory is created when missing and one connection is
    /// opened to verify the file is usable. Schema is not touched.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DbError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        drop(open_connection(&path)?);

        info!(
            "event=store_open module=db status=ok mode=file path={}",
            path.display()
        );
        Ok(Self {
            backend: Backend::File(path),
            schema_ready: OnceCell::new(),
        })
    }

    /// Creates a handle to a private in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = open_connection_in_memory()?;
        info!("event=store_open module=db status=ok mode=memory");
        Ok(Self {
            backend: Backend::Memory(Mutex::new(conn)),
            schema_ready: OnceCell::new(),
        })
    }

    /// Returns the backing file path, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        match &self.backend {
            Backend::File(path) => Some(path.as_path()),
            Backend::Memory(_) => None,
        }
    }

    /// Creates every table if absent.
    ///
    /// Subsequent calls on the same handle are no-ops. Failure is returned to
    /// the caller and is meant to abort startup.
    pub fn ensure_schema(&self) -> DbResult<()> {
        self.schema_ready
            .get_or_try_init(|| {
                self.with_connection(|conn| apply_migrations(conn).map(|_| ()))
                    .map_err(|err| {
                        error!(
                            "event=schema_init module=db status=error error={}",
                            err
                        );
                        err
                    })
            })
            .map(|_| ())
    }

    /// Inserts deterministic example rows into every empty table.
    ///
    /// Per-table failures are logged and reported, not propagated; only a
    /// failure to reach the store at all is an `Err`.
    pub fn seed_if_empty(&self) -> DbResult<SeedReport> {
        self.ensure_schema()?;
        self.with_connection(|conn| Ok::<_, DbError>(seed_if_empty(conn)))
    }

    /// Ensures schema and seeds empty tables. Intended for process startup.
    pub fn initialize(&self) -> DbResult<SeedReport> {
        self.ensure_schema()?;
        self.seed_if_empty()
    }

    /// Runs `op` with a connection scoped to this call.
    pub fn with_connection<T, E>(
        &self,
        op: impl FnOnce(&mut Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        match &self.backend {
            Backend::File(path) => {
                let mut conn = open_connection(path)?;
                op(&mut conn)
            }
            Backend::Memory(shared) => {
                let mut guard = shared.lock().map_err(|_| DbError::ConnectionPoisoned)?;
                op(&mut *guard)
            }
        }
    }
}
