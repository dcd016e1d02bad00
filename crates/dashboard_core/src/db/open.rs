//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout, so
//!   concurrent writers from other processes wait instead of failing fast.
//! - Opening a connection never touches schema; see [`super::Store`].

use super::DbResult;
use log::{debug, error};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a configured connection to a SQLite database file.
///
/// # Side effects
/// - Creates the database file when missing.
/// - Emits `db_connect` debug events with duration, and an error event on failure.
pub fn open_connection(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    let path = path.as_ref();

    let conn = Connection::open(path)
        .map_err(Into::into)
        .and_then(configure);

    match conn {
        Ok(conn) => {
            debug!(
                "event=db_connect module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_connect module=db status=error mode=file path={} duration_ms={} error={}",
                path.display(),
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens a configured in-memory SQLite connection.
pub fn open_connection_in_memory() -> DbResult<Connection> {
    let conn = Connection::open_in_memory()?;
    let conn = configure(conn)?;
    debug!("event=db_connect module=db status=ok mode=memory");
    Ok(conn)
}

fn configure(conn: Connection) -> DbResult<Connection> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}
